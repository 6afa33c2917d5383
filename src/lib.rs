//! **mathmaze** generates room and door mazes, turns them into walkable level geometry and runs
//! the timed escape game played in them: every closed door asks an arithmetic question.

pub mod cells;
pub mod errors;
pub mod expression;
pub mod grid_dimensions;
pub mod grid_displays;
pub mod maze;
pub mod pathing;
pub mod physics;
pub mod player;
pub mod renderers;
pub mod room_plan;
pub mod session;
pub mod tile_grid;
pub mod units;
pub mod utils;
pub mod world;
