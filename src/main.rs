use docopt::Docopt;
use error_chain::bail;
use log::info;
use mathmaze::{
    cells::{Cartesian2DCoordinate, CoordinateSmallVec},
    grid_dimensions::MazeDimensions,
    grid_displays::{parse_tile_grid, PathDisplay, StartEndPointsDisplay, TileGridDisplay},
    maze::{MazeDescriptor, MazeGeneratorBuilder},
    pathing,
    renderers,
    session::{DungeonSession, SessionOutcome},
    units::{RoomPlaneSize, RoomSize},
};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use serde_derive::Deserialize;
use std::{
    io,
    io::prelude::*,
    fs::{self, File},
    path::Path,
};

const USAGE: &str = "MathMaze

Usage:
    mathmaze_driver -h | --help
    mathmaze_driver [text [--text-out=<path>]] [image --image-out=<path> [--tile-pixels=<n>] [--mark-start-end]] [--show-path] [--seed=<n>] [--room-plane-size=<n>] [--room-size=<n>] [--load-grid=<path>] [--save-grid=<path>]
    mathmaze_driver play [--mistakes=<n>] [--seed=<n>] [--room-plane-size=<n>] [--room-size=<n>] [--load-grid=<path>] [--save-grid=<path>]

Options:
    -h --help                Show this screen.
    --text-out=<path>        Output file path for a textual rendering of a maze. Printed to stdout if not given.
    --image-out=<path>       Output file path for an image rendering of a maze. Always PNG format.
    --tile-pixels=<n>        Pixel count for the side of one tile in an image [default: 12].
    --mark-start-end         Mark the start tile and the exit portal on an image.
    --show-path              Show the shortest path from the start to the exit portal.
    --seed=<n>               Seed for the maze generator and the play session. Fresh entropy if not given.
    --room-plane-size=<n>    The room plan is n * n rooms [default: 7].
    --room-size=<n>          Rooms are n * n tiles, n odd [default: 3].
    --load-grid=<path>       Read a maze saved with --save-grid instead of generating one.
    --save-grid=<path>       Write the maze's tiles to a text file.
    --mistakes=<n>           Wrong answers given at each door before the right one [default: 0].
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_text: bool,
    flag_text_out: String,
    cmd_image: bool,
    flag_image_out: String,
    flag_tile_pixels: u32,
    flag_mark_start_end: bool,
    flag_show_path: bool,
    cmd_play: bool,
    flag_mistakes: usize,
    flag_seed: Option<u64>,
    flag_room_plane_size: usize,
    flag_room_size: usize,
    flag_load_grid: String,
    flag_save_grid: String,
}

mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mathmaze::errors::Error, ::mathmaze::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            RandFailure(::rand::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let descriptor = load_or_generate_maze(&args)?;
    info!("maze of side {} with {} rooms, starting at {:?}",
          descriptor.maze().side(),
          descriptor.rooms_count().0,
          descriptor.starting_position());

    if !args.flag_save_grid.is_empty() {
        write_text_to_file(&descriptor.maze().to_string(), &args.flag_save_grid)
            .chain_err(|| format!("Failed to write maze grid to text file {}", args.flag_save_grid))?;
    }

    if args.cmd_play {
        return play(&descriptor, &args);
    }

    let path = if args.flag_show_path {
        Some(pathing::path_to_exit(descriptor.maze(), descriptor.starting_position())
            .ok_or("There is no route from the start to the exit portal.")?)
    } else {
        None
    };

    // Text is the default when no rendering is asked for.
    if args.cmd_text || !args.cmd_image {
        let start_end = StartEndPointsDisplay::new(as_coordinate_smallvec(Some(descriptor.starting_position())),
                                                   as_coordinate_smallvec(descriptor.exit_position()));
        let path_display = PathDisplay::new(path.as_deref().unwrap_or(&[]));
        let text = TileGridDisplay::new(descriptor.maze())
            .overlay(&start_end)
            .overlay(&path_display)
            .to_string();

        if args.flag_text_out.is_empty() {
            print!("{}", text);
        } else {
            write_text_to_file(&text, &args.flag_text_out)
                .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
        }
    }

    if args.cmd_image {
        let render_options = renderers::RenderOptionsBuilder::new()
            .tile_pixels(args.flag_tile_pixels)
            .mark_start_end(args.flag_mark_start_end)
            .start(Some(descriptor.starting_position()))
            .end(descriptor.exit_position())
            .show_path(args.flag_show_path)
            .path(path)
            .output_file(Some(Path::new(&args.flag_image_out)))
            .build();
        renderers::render_tile_grid(descriptor.maze(), &render_options)?;
    }

    Ok(())
}

fn load_or_generate_maze(maze_args: &MazeArgs) -> Result<MazeDescriptor> {
    let room_size = RoomSize(maze_args.flag_room_size);

    if !maze_args.flag_load_grid.is_empty() {
        let text = fs::read_to_string(&maze_args.flag_load_grid)
            .chain_err(|| format!("Failed to read maze grid from {}", maze_args.flag_load_grid))?;
        let grid = parse_tile_grid(&text)?;
        return Ok(MazeDescriptor::from_grid(grid, room_size)?);
    }

    let dimensions = MazeDimensions::new(RoomPlaneSize(maze_args.flag_room_plane_size), room_size)?;
    let mut generator = MazeGeneratorBuilder::new()
        .dimensions(dimensions)
        .seed(maze_args.flag_seed)
        .build()?;
    Ok(generator.generate_maze()?)
}

/// Runs a headless session, walking the shortest route to the exit and answering every door.
fn play(descriptor: &MazeDescriptor, maze_args: &MazeArgs) -> Result<()> {
    let path = pathing::path_to_exit(descriptor.maze(), descriptor.starting_position())
        .ok_or("There is no route from the start to the exit portal.")?;
    println!("{} rooms, {} doors on the {} tile route to the exit",
             descriptor.rooms_count().0,
             pathing::doors_on_path(descriptor.maze(), &path),
             path.len());

    let rng = match maze_args.flag_seed {
        Some(seed) => XorShiftRng::seed_from_u64(seed),
        None => XorShiftRng::from_rng(rand::thread_rng())?,
    };
    let mut session = DungeonSession::new(descriptor, rng)?;

    match session.follow_path(&path, maze_args.flag_mistakes)? {
        Some(SessionOutcome::Escaped) => {
            println!("Escaped with {:.1}s to spare after opening {} doors.",
                     session.time_remaining().0 as f64 / 1000.0,
                     session.doors_opened());
        }
        Some(SessionOutcome::GameOver) => {
            println!("Game over at {:?} after opening {} doors.",
                     session.player_tile(),
                     session.doors_opened());
        }
        None => bail!("The autopilot got stuck at {:?}.", session.player_tile()),
    }
    Ok(())
}

fn as_coordinate_smallvec(coord: Option<Cartesian2DCoordinate>) -> CoordinateSmallVec {
    coord.into_iter().collect::<CoordinateSmallVec>()
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
