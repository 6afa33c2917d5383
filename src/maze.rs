use error_chain::bail;
use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use crate::cells::Cartesian2DCoordinate;
use crate::errors::*;
use crate::grid_dimensions::MazeDimensions;
use crate::room_plan::{generate_room_plan, place_exit_room, RoomPlan};
use crate::tile_grid::{compile_tile_grid, MazeTile, TileGrid};
use crate::units::{RoomPlaneSize, RoomSize, RoomsCount};

/// A plan whose centre room never grows is carved again, at most this many times in all.
pub const MAX_PLAN_ATTEMPTS: usize = 64;

/// A generated maze: the finished tile grid, where the player starts and how many rooms were carved.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MazeDescriptor {
    maze: TileGrid,
    starting_position: Cartesian2DCoordinate,
    rooms_count: RoomsCount,
}

impl MazeDescriptor {
    /// A descriptor for a grid made elsewhere, such as one loaded from a saved text grid.
    pub fn from_parts(maze: TileGrid,
                      starting_position: Cartesian2DCoordinate,
                      rooms_count: RoomsCount)
                      -> MazeDescriptor {
        MazeDescriptor {
            maze,
            starting_position,
            rooms_count,
        }
    }

    /// A descriptor for a saved grid laid out with rooms of `room_size`. The player starts at the
    /// centre tile of the centre room, exactly as for a generated maze.
    pub fn from_grid(maze: TileGrid, room_size: RoomSize) -> Result<MazeDescriptor> {
        let stride = room_size.0 + 1;
        if maze.side() == 0 || (maze.side() - 1) % stride != 0 {
            bail!(ErrorKind::InvalidDimensions(format!("a grid of side {} is not made of rooms of side {}",
                                                       maze.side(),
                                                       room_size.0)));
        }
        let dimensions = MazeDimensions::new(RoomPlaneSize((maze.side() - 1) / stride), room_size)?;

        let starting_position = dimensions.room_centre_tile(dimensions.room_plan_centre());
        if !maze[starting_position].is_walkable() {
            bail!(ErrorKind::InvalidDimensions(format!("starting tile {:?} is void", starting_position)));
        }
        let room_tiles = maze.count(MazeTile::Room) + maze.count(MazeTile::ExitPortal);
        let rooms_count = RoomsCount(room_tiles / (room_size.0 * room_size.0));

        Ok(MazeDescriptor::from_parts(maze, starting_position, rooms_count))
    }

    #[inline]
    pub fn maze(&self) -> &TileGrid {
        &self.maze
    }

    #[inline]
    pub fn starting_position(&self) -> Cartesian2DCoordinate {
        self.starting_position
    }

    #[inline]
    pub fn rooms_count(&self) -> RoomsCount {
        self.rooms_count
    }

    pub fn exit_position(&self) -> Option<Cartesian2DCoordinate> {
        self.maze.find(MazeTile::ExitPortal)
    }

    pub fn count_tiles(&self, kind: MazeTile) -> usize {
        self.maze.count(kind)
    }
}

#[derive(Debug)]
pub struct MazeGenerator<R: Rng> {
    rng: R,
    dimensions: MazeDimensions,
    max_plan_attempts: usize,
}

impl<R: Rng> MazeGenerator<R> {
    pub fn new(rng: R, dimensions: MazeDimensions) -> MazeGenerator<R> {
        MazeGenerator {
            rng,
            dimensions,
            max_plan_attempts: MAX_PLAN_ATTEMPTS,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> &MazeDimensions {
        &self.dimensions
    }

    /// Carves a room plan with an exit and compiles it to tiles. The player starts at the centre
    /// tile of the centre room, which is the grid centre whenever the room plane side is odd.
    pub fn generate_maze(&mut self) -> Result<MazeDescriptor> {
        let (plan, rooms_count) = self.generate_plan_with_exit()?;
        let maze = compile_tile_grid(&plan, &self.dimensions, &mut self.rng);
        let starting_position = self.dimensions.room_centre_tile(self.dimensions.room_plan_centre());
        debug!("maze of {} rooms ready, starting at {:?}", rooms_count.0, starting_position);

        Ok(MazeDescriptor {
            maze,
            starting_position,
            rooms_count,
        })
    }

    fn generate_plan_with_exit(&mut self) -> Result<(RoomPlan, RoomsCount)> {
        for attempt in 1..=self.max_plan_attempts {
            let (mut plan, rooms_count) = generate_room_plan(&mut self.rng, &self.dimensions);
            if place_exit_room(&mut plan).is_some() {
                return Ok((plan, rooms_count));
            }
            warn!("room plan attempt {} carved only the centre room, carving again", attempt);
        }
        bail!(ErrorKind::DegenerateRoomPlan(self.max_plan_attempts))
    }
}

impl MazeGenerator<XorShiftRng> {
    /// A generator seeded from the thread local entropy source.
    pub fn from_entropy(dimensions: MazeDimensions) -> Result<MazeGenerator<XorShiftRng>> {
        let rng = XorShiftRng::from_rng(rand::thread_rng())?;
        Ok(MazeGenerator::new(rng, dimensions))
    }
}

#[derive(Debug, Default)]
pub struct MazeGeneratorBuilder {
    dimensions: Option<MazeDimensions>,
    seed: Option<u64>,
    max_plan_attempts: Option<usize>,
}

impl MazeGeneratorBuilder {
    pub fn new() -> MazeGeneratorBuilder {
        MazeGeneratorBuilder::default()
    }
    pub fn dimensions(mut self, dimensions: MazeDimensions) -> MazeGeneratorBuilder {
        self.dimensions = Some(dimensions);
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> MazeGeneratorBuilder {
        self.seed = seed;
        self
    }
    pub fn max_plan_attempts(mut self, attempts: usize) -> MazeGeneratorBuilder {
        self.max_plan_attempts = Some(attempts);
        self
    }
    pub fn build(self) -> Result<MazeGenerator<XorShiftRng>> {
        let dimensions = self.dimensions.unwrap_or_default();
        let mut generator = match self.seed {
            Some(seed) => MazeGenerator::new(XorShiftRng::seed_from_u64(seed), dimensions),
            None => MazeGenerator::from_entropy(dimensions)?,
        };
        if let Some(attempts) = self.max_plan_attempts {
            if attempts == 0 {
                bail!(ErrorKind::InvalidDimensions("at least one room plan attempt is needed".to_owned()));
            }
            generator.max_plan_attempts = attempts;
        }
        Ok(generator)
    }
}

/// Generates a maze of the default dimensions from fresh entropy.
pub fn generate_maze() -> Result<MazeDescriptor> {
    MazeGenerator::from_entropy(MazeDimensions::default())?.generate_maze()
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::grid_displays::parse_tile_grid;
    use quickcheck::quickcheck;

    #[test]
    fn fresh_maze_starts_on_a_room() {
        let descriptor = generate_maze().expect("generation failed");
        assert_eq!(descriptor.starting_position(), Cartesian2DCoordinate::new(14, 14));
        assert!(descriptor.rooms_count().0 >= 1);
        assert_eq!(descriptor.maze()[descriptor.starting_position()], MazeTile::Room);
        assert_eq!(descriptor.maze().side(), 29);
        assert_eq!(descriptor.count_tiles(MazeTile::ExitPortal), 1);
    }

    #[test]
    fn rooms_count_matches_the_tiles() {
        fn p(seed: u64) -> bool {
            let mut generator = MazeGeneratorBuilder::new().seed(Some(seed)).build().unwrap();
            let descriptor = generator.generate_maze().unwrap();
            let room_tiles = descriptor.count_tiles(MazeTile::Room) +
                             descriptor.count_tiles(MazeTile::ExitPortal);
            room_tiles == descriptor.rooms_count().0 * 9 && descriptor.rooms_count().0 >= 2
        }
        quickcheck(p as fn(u64) -> bool);
    }

    #[test]
    fn seeded_generators_agree() {
        let build = || MazeGeneratorBuilder::new().seed(Some(42)).build().unwrap();
        let (mut a, mut b) = (build(), build());
        assert_eq!(a.generate_maze().unwrap(), b.generate_maze().unwrap());
        assert_eq!(a.generate_maze().unwrap(), b.generate_maze().unwrap());
    }

    #[test]
    fn exit_is_in_the_furthest_room() {
        let mut generator = MazeGeneratorBuilder::new().seed(Some(8)).build().unwrap();
        let descriptor = generator.generate_maze().unwrap();
        let exit = descriptor.exit_position().unwrap();
        let dims = generator.dimensions();
        let exit_room = dims.tile_to_room(exit);
        let centre = dims.room_plan_centre();

        let furthest = descriptor.maze()
            .iter()
            .filter(|&(coord, tile)| tile.is_walkable() && !dims.is_seam(coord))
            .map(|(coord, _)| dims.tile_to_room(coord).manhattan_distance(centre))
            .max()
            .unwrap();
        assert_eq!(exit_room.manhattan_distance(centre), furthest);
    }

    #[test]
    fn small_plans_retry_until_an_exit_exists() {
        let dims = MazeDimensions::new(RoomPlaneSize(2), RoomSize(3)).unwrap();
        for seed in 0..50 {
            let mut generator = MazeGeneratorBuilder::new()
                .dimensions(dims)
                .seed(Some(seed))
                .build()
                .unwrap();
            let descriptor = generator.generate_maze().unwrap();
            assert!(descriptor.rooms_count().0 >= 2);
            assert_eq!(descriptor.count_tiles(MazeTile::ExitPortal), 1);
            assert_eq!(descriptor.starting_position(), Cartesian2DCoordinate::new(6, 6));
            assert_eq!(descriptor.maze()[descriptor.starting_position()], MazeTile::Room);
        }
    }

    #[test]
    fn zero_attempts_is_rejected() {
        match MazeGeneratorBuilder::new().max_plan_attempts(0).build() {
            Err(e) => match *e.kind() {
                ErrorKind::InvalidDimensions(ref reason) => assert!(reason.contains("attempt")),
                ref kind => panic!("unexpected error {:?}", kind),
            },
            Ok(_) => panic!("zero plan attempts accepted"),
        }
        assert!(MazeGeneratorBuilder::new().max_plan_attempts(1).build().is_ok());
    }

    #[test]
    fn saved_grids_describe_themselves() {
        fn p(seed: u64) -> bool {
            let mut generator = MazeGeneratorBuilder::new().seed(Some(seed)).build().unwrap();
            let descriptor = generator.generate_maze().unwrap();
            let reloaded = parse_tile_grid(&descriptor.maze().to_string()).unwrap();
            MazeDescriptor::from_grid(reloaded, RoomSize(3)).ok() == Some(descriptor)
        }
        quickcheck(p as fn(u64) -> bool);
    }

    #[test]
    fn saved_grids_must_fit_the_room_size() {
        let grid = TileGrid::new(crate::units::MazeSize(29));
        assert!(MazeDescriptor::from_grid(grid.clone(), RoomSize(5)).is_err());
        // Right shape, but every tile is void.
        assert!(MazeDescriptor::from_grid(grid, RoomSize(3)).is_err());
    }
}
