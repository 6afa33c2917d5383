// Flood fill distances over the tile grid.
//
// Every walkable tile links to each walkable tile next to it, so there are no edge weights to consider:
// the first time a tile is reached by the frontier its distance is final. The distances map doubles
// as the visited set.

use itertools::Itertools;
use smallvec::SmallVec;

use crate::cells::{offset_coordinate, Cartesian2DCoordinate, CompassPrimary, CoordinateSmallVec};
use crate::tile_grid::{MazeTile, TileGrid};
use crate::utils;
use crate::utils::FnvHashMap;

#[derive(Debug, Clone)]
pub struct Distances {
    start_coordinate: Cartesian2DCoordinate,
    distances: FnvHashMap<Cartesian2DCoordinate, u32>,
    max_distance: u32,
}

/// Walkable tiles sharing an edge with `coord`, up/right/down/left.
pub fn walkable_neighbours(grid: &TileGrid, coord: Cartesian2DCoordinate) -> CoordinateSmallVec {
    CompassPrimary::ALL
        .iter()
        .filter_map(|dir| offset_coordinate(coord, *dir, grid.side()))
        .filter(|neighbour| grid[*neighbour].is_walkable())
        .collect()
}

impl Distances {
    /// None when the start is outside the grid or not walkable.
    pub fn new(grid: &TileGrid, start_coordinate: Cartesian2DCoordinate) -> Option<Distances> {
        match grid.get(start_coordinate.x, start_coordinate.y) {
            Some(tile) if tile.is_walkable() => {}
            _ => return None,
        }

        let mut max = 0;
        let mut distances = utils::fnv_hashmap(grid.side() * grid.side());
        distances.insert(start_coordinate, 0);

        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for tile_coord in &frontier {
                let distance_to_tile = distances[tile_coord];
                if distance_to_tile > max {
                    max = distance_to_tile;
                }

                for neighbour in walkable_neighbours(grid, *tile_coord) {
                    if !distances.contains_key(&neighbour) {
                        distances.insert(neighbour, distance_to_tile + 1);
                        new_frontier.push(neighbour);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start_coordinate,
            distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Cartesian2DCoordinate {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, coord: Cartesian2DCoordinate) -> Option<u32> {
        self.distances.get(&coord).cloned()
    }

    /// Number of tiles reachable from the start, the start included.
    pub fn reachable_count(&self) -> usize {
        self.distances.len()
    }

    /// The tiles at the maximum distance, sorted so the result does not depend on hash order.
    pub fn furthest_points_on_grid(&self) -> SmallVec<[Cartesian2DCoordinate; 8]> {
        let furthest_distance = self.max();
        self.distances
            .iter()
            .filter(|&(_, distance)| *distance == furthest_distance)
            .map(|(coord, _)| *coord)
            .sorted()
            .collect()
    }
}

/// Walks back from `end_point` to the start of `distances_from_start`, always stepping to the
/// neighbour closest to the start. None if the end point was never reached.
pub fn shortest_path(grid: &TileGrid,
                     distances_from_start: &Distances,
                     end_point: Cartesian2DCoordinate)
                     -> Option<Vec<Cartesian2DCoordinate>> {

    distances_from_start.distance_from_start_to(end_point)?;

    let mut path = vec![end_point];
    let start = distances_from_start.start();
    let mut current_coord = end_point;

    while current_coord != start {
        let current_distance_to_start = distances_from_start.distance_from_start_to(current_coord)?;

        let closest_to_start = walkable_neighbours(grid, current_coord)
            .iter()
            .filter_map(|coord| {
                distances_from_start.distance_from_start_to(*coord).map(|d| (*coord, d))
            })
            .min_by_key(|&(_, distance)| distance);

        match closest_to_start {
            Some((closer_coord, closer_distance)) if closer_distance < current_distance_to_start => {
                current_coord = closer_coord;
                path.push(current_coord);
            }
            // The distances were computed over some other grid.
            _ => return None,
        }
    }

    path.reverse();
    Some(path)
}

/// Doors a player must open walking the given path.
pub fn doors_on_path(grid: &TileGrid, path: &[Cartesian2DCoordinate]) -> usize {
    path.iter()
        .filter(|coord| grid.get(coord.x, coord.y) == Some(MazeTile::Door))
        .count()
}

/// Shortest route from `start` to the exit portal, if the grid has a reachable one.
pub fn path_to_exit(grid: &TileGrid, start: Cartesian2DCoordinate) -> Option<Vec<Cartesian2DCoordinate>> {
    let exit = grid.find(MazeTile::ExitPortal)?;
    let distances = Distances::new(grid, start)?;
    shortest_path(grid, &distances, exit)
}
