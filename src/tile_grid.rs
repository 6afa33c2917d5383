use error_chain::bail;
use itertools::Itertools;
use log::debug;
use rand::Rng;
use std::ops::Index;

use crate::cells::{offset_coordinate, Cartesian2DCoordinate, CompassPrimary};
use crate::errors::*;
use crate::grid_dimensions::MazeDimensions;
use crate::room_plan::{RoomPlan, RoomPlanCell};
use crate::units::MazeSize;

/// A draw in `0..DOOR_DRAW_RANGE` above `DOOR_DRAW_THRESHOLD` makes a door.
pub const DOOR_DRAW_RANGE: u32 = 10;
pub const DOOR_DRAW_THRESHOLD: u32 = 2;

/// The logical content of one tile.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum MazeTile {
    Void,
    Room,
    Corridor,
    Door,
    ExitPortal,
}

impl MazeTile {
    /// Anything the player can stand on.
    #[inline]
    pub fn is_walkable(&self) -> bool {
        *self != MazeTile::Void
    }
}

/// The fine tile grid. Fixed size, stored flat and indexed `[x][y]`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TileGrid {
    side: usize,
    tiles: Vec<MazeTile>,
}

impl TileGrid {
    pub fn new(MazeSize(side): MazeSize) -> TileGrid {
        TileGrid {
            side,
            tiles: vec![MazeTile::Void; side * side],
        }
    }

    /// A grid from tiles already laid out `[x][y]`, as `iter` yields them.
    pub fn from_tiles(side: usize, tiles: Vec<MazeTile>) -> Result<TileGrid> {
        if side == 0 || tiles.len() != side * side {
            bail!(ErrorKind::InvalidDimensions(format!("{} tiles do not fill a grid of side {}",
                                                       tiles.len(), side)));
        }
        Ok(TileGrid { side, tiles })
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn is_valid_coordinate(&self, coord: Cartesian2DCoordinate) -> bool {
        (coord.x as usize) < self.side && (coord.y as usize) < self.side
    }

    /// None outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<MazeTile> {
        let coord = Cartesian2DCoordinate::new(x, y);
        if self.is_valid_coordinate(coord) {
            Some(self.tiles[coord.column_major_index(self.side)])
        } else {
            None
        }
    }

    /// The neighbouring tile in a direction, treating everything outside the grid as void.
    pub fn neighbour_tile(&self, coord: Cartesian2DCoordinate, dir: CompassPrimary) -> MazeTile {
        offset_coordinate(coord, dir, self.side)
            .map_or(MazeTile::Void, |neighbour| self[neighbour])
    }

    fn set(&mut self, coord: Cartesian2DCoordinate, tile: MazeTile) {
        let index = coord.column_major_index(self.side);
        self.tiles[index] = tile;
    }

    /// Every coordinate, x outer and y inner.
    pub fn iter(&self) -> impl Iterator<Item = (Cartesian2DCoordinate, MazeTile)> + '_ {
        let side = self.side;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(index, tile)| (Cartesian2DCoordinate::from_column_major_index(index, side), *tile))
    }

    pub fn count(&self, kind: MazeTile) -> usize {
        self.tiles.iter().filter(|tile| **tile == kind).count()
    }

    pub fn find(&self, kind: MazeTile) -> Option<Cartesian2DCoordinate> {
        self.iter()
            .find(|&(_, tile)| tile == kind)
            .map(|(coord, _)| coord)
    }
}

impl Index<Cartesian2DCoordinate> for TileGrid {
    type Output = MazeTile;

    /// Panics outside the grid, like slice indexing.
    fn index(&self, coord: Cartesian2DCoordinate) -> &MazeTile {
        assert!(self.is_valid_coordinate(coord), "tile {:?} outside the grid", coord);
        &self.tiles[coord.column_major_index(self.side)]
    }
}

/// Expands each room of the plan into a block of room tiles.
///
/// Seams and the blocks of empty plan cells are void. The centre tile of the exit room's
/// block is the exit portal.
pub fn lay_out_rooms(plan: &RoomPlan, dimensions: &MazeDimensions) -> TileGrid {
    let mut grid = TileGrid::new(dimensions.maze_size());

    let side = grid.side() as u32;
    for (x, y) in (0..side).cartesian_product(0..side) {
        let tile_coord = Cartesian2DCoordinate::new(x, y);
        if dimensions.is_seam(tile_coord) {
            continue;
        }

        let room = dimensions.tile_to_room(tile_coord);
        let tile = match plan.get(room) {
            Some(RoomPlanCell::Room) => MazeTile::Room,
            Some(RoomPlanCell::ExitRoom) => {
                if dimensions.room_centre_tile(room) == tile_coord {
                    MazeTile::ExitPortal
                } else {
                    MazeTile::Room
                }
            }
            Some(RoomPlanCell::Empty) | None => MazeTile::Void,
        };
        grid.set(tile_coord, tile);
    }

    grid
}

/// Joins rooms across seams with doors or corridors.
///
/// A void connection candidate becomes a connection when both tiles either side of it on
/// one axis are room tiles, left/right checked before up/down. Each connection is a door
/// with probability 0.7, otherwise a corridor. The outer ring is never touched.
pub fn carve_room_connections<R: Rng>(grid: &mut TileGrid, dimensions: &MazeDimensions, rng: &mut R) {
    let is_room = |grid: &TileGrid, coord: Cartesian2DCoordinate, dir: CompassPrimary| {
        grid.neighbour_tile(coord, dir) == MazeTile::Room
    };
    let (mut doors, mut corridors) = (0, 0);

    for index in 0..grid.tiles.len() {
        let coord = Cartesian2DCoordinate::from_column_major_index(index, grid.side());
        if !dimensions.is_connection_candidate(coord) || grid[coord] != MazeTile::Void {
            continue;
        }

        let joins_left_right = is_room(grid, coord, CompassPrimary::West) &&
                               is_room(grid, coord, CompassPrimary::East);
        let joins_top_bottom = is_room(grid, coord, CompassPrimary::North) &&
                               is_room(grid, coord, CompassPrimary::South);
        if !(joins_left_right || joins_top_bottom) {
            continue;
        }

        if rng.gen_range(0..DOOR_DRAW_RANGE) > DOOR_DRAW_THRESHOLD {
            grid.set(coord, MazeTile::Door);
            doors += 1;
        } else {
            grid.set(coord, MazeTile::Corridor);
            corridors += 1;
        }
    }

    debug!("connected rooms with {} doors and {} corridors", doors, corridors);
}

/// Room layout followed by connection carving.
pub fn compile_tile_grid<R: Rng>(plan: &RoomPlan, dimensions: &MazeDimensions, rng: &mut R) -> TileGrid {
    let mut grid = lay_out_rooms(plan, dimensions);
    carve_room_connections(&mut grid, dimensions, rng);
    grid
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::cells::DirectionMask;
    use crate::room_plan::{carve_room_plan, generate_room_plan, place_exit_room};
    use quickcheck::quickcheck;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    fn random_plan(seed: u64) -> (RoomPlan, MazeDimensions) {
        let dims = MazeDimensions::default();
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let (mut plan, _) = generate_room_plan(&mut rng, &dims);
        place_exit_room(&mut plan);
        (plan, dims)
    }

    fn is_seam_or_void(grid: &TileGrid, dims: &MazeDimensions) -> bool {
        grid.iter()
            .filter(|&(coord, _)| dims.is_seam(coord))
            .all(|(_, tile)| tile == MazeTile::Void)
    }

    #[test]
    fn full_plan_layout() {
        let dims = MazeDimensions::default();
        let (mut plan, _) = carve_room_plan(&dims, || DirectionMask::ALL);
        place_exit_room(&mut plan);
        let grid = lay_out_rooms(&plan, &dims);

        assert_eq!(grid.side(), 29);
        assert_eq!(grid.count(MazeTile::Room), 49 * 9 - 1);
        assert_eq!(grid.count(MazeTile::ExitPortal), 1);
        assert_eq!(grid.find(MazeTile::ExitPortal), Some(gc(2, 2)));
        assert!(is_seam_or_void(&grid, &dims));
        assert_eq!(grid[gc(14, 14)], MazeTile::Room);
    }

    #[test]
    fn full_plan_connections() {
        let dims = MazeDimensions::default();
        let (mut plan, _) = carve_room_plan(&dims, || DirectionMask::ALL);
        place_exit_room(&mut plan);
        let mut rng = XorShiftRng::seed_from_u64(99);
        let grid = compile_tile_grid(&plan, &dims, &mut rng);

        // 7 rows of 6 inner vertical seams, twice over for the horizontal ones
        let connections = grid.count(MazeTile::Door) + grid.count(MazeTile::Corridor);
        assert_eq!(connections, 2 * 7 * 6);
        assert!(grid[gc(4, 2)] == MazeTile::Door || grid[gc(4, 2)] == MazeTile::Corridor);
        assert_eq!(grid[gc(4, 4)], MazeTile::Void);
        assert_eq!(grid[gc(0, 2)], MazeTile::Void);
    }

    #[test]
    fn empty_rooms_are_void() {
        let dims = MazeDimensions::default();
        let nothing = RoomPlan::new(dims.room_plane_size());
        let grid = lay_out_rooms(&nothing, &dims);
        assert_eq!(grid.count(MazeTile::Void), 29 * 29);

        let (plan, _) = carve_room_plan(&dims, || DirectionMask::new(0b0100).unwrap());
        let mut rng = XorShiftRng::seed_from_u64(3);
        let grid = compile_tile_grid(&plan, &dims, &mut rng);
        // centre row rooms 3..=6 are joined by three seams
        assert_eq!(grid.count(MazeTile::Door) + grid.count(MazeTile::Corridor), 3);
        assert_eq!(grid.neighbour_tile(gc(13, 14), CompassPrimary::West), MazeTile::Void);
    }

    #[test]
    fn exit_portal_is_never_a_connection_partner() {
        let dims = MazeDimensions::default();
        let (mut plan, _) = carve_room_plan(&dims, || DirectionMask::new(0b0100).unwrap());
        place_exit_room(&mut plan);
        let grid = lay_out_rooms(&plan, &dims);
        // exit is the far east room (6, 3); its portal sits off the seam lines
        let portal = dims.room_centre_tile(gc(6, 3));
        assert_eq!(grid[portal], MazeTile::ExitPortal);
        assert_eq!(grid.neighbour_tile(portal, CompassPrimary::West), MazeTile::Room);
        assert_eq!(grid.neighbour_tile(portal, CompassPrimary::East), MazeTile::Room);
    }

    #[test]
    fn outside_the_grid() {
        let grid = TileGrid::new(MazeSize(5));
        assert_eq!(grid.get(5, 0), None);
        assert_eq!(grid.get(4, 4), Some(MazeTile::Void));
        assert_eq!(grid.neighbour_tile(gc(0, 0), CompassPrimary::North), MazeTile::Void);
    }

    #[test]
    fn compiled_grids_hold_their_invariants() {
        fn p(seed: u64) -> bool {
            let (plan, dims) = random_plan(seed);
            let mut rng = XorShiftRng::seed_from_u64(seed.wrapping_add(1));
            let grid = compile_tile_grid(&plan, &dims, &mut rng);

            let one_portal = grid.count(MazeTile::ExitPortal) == 1;
            let seams_void_or_connection = grid.iter()
                .filter(|&(coord, _)| dims.is_seam(coord))
                .all(|(_, tile)| match tile {
                    MazeTile::Void | MazeTile::Door | MazeTile::Corridor => true,
                    _ => false,
                });
            let connections_join_rooms = grid.iter()
                .filter(|&(_, tile)| tile == MazeTile::Door || tile == MazeTile::Corridor)
                .all(|(coord, _)| {
                    let room = |dir: CompassPrimary| grid.neighbour_tile(coord, dir) == MazeTile::Room;
                    (room(CompassPrimary::West) && room(CompassPrimary::East)) ||
                    (room(CompassPrimary::North) && room(CompassPrimary::South))
                });
            let border_void = grid.iter()
                .filter(|&(coord, _)| dims.is_border(coord))
                .all(|(_, tile)| tile == MazeTile::Void);
            let start_is_room = grid[dims.maze_centre()] == MazeTile::Room;

            one_portal && seams_void_or_connection && connections_join_rooms && border_void &&
            start_is_room
        }
        quickcheck(p as fn(u64) -> bool);
    }

    #[test]
    fn recompiling_only_changes_connection_kinds() {
        fn p(seed: u64) -> bool {
            let (plan, dims) = random_plan(seed);
            let mut rng_a = XorShiftRng::seed_from_u64(seed);
            let mut rng_b = XorShiftRng::seed_from_u64(!seed);
            let a = compile_tile_grid(&plan, &dims, &mut rng_a);
            let b = compile_tile_grid(&plan, &dims, &mut rng_b);

            let is_connection = |tile: MazeTile| tile == MazeTile::Door || tile == MazeTile::Corridor;
            let only_connections_differ = a.iter().zip(b.iter()).all(|((coord, tile_a), (_, tile_b))| {
                tile_a == tile_b ||
                (dims.is_seam(coord) && is_connection(tile_a) && is_connection(tile_b))
            });
            only_connections_differ
        }
        quickcheck(p as fn(u64) -> bool);
    }

    #[test]
    fn same_seed_same_grid() {
        let (plan, dims) = random_plan(17);
        let mut rng_a = XorShiftRng::seed_from_u64(5);
        let mut rng_b = XorShiftRng::seed_from_u64(5);
        assert_eq!(compile_tile_grid(&plan, &dims, &mut rng_a),
                   compile_tile_grid(&plan, &dims, &mut rng_b));
    }
}
