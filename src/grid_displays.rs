use error_chain::bail;
use std::fmt;

use crate::cells::{Cartesian2DCoordinate, CoordinateSmallVec};
use crate::errors::*;
use crate::tile_grid::{MazeTile, TileGrid};
use crate::utils::FnvHashSet;

pub const VOID_SYMBOL: char = '#';
pub const ROOM_SYMBOL: char = '.';
pub const CORRIDOR_SYMBOL: char = ',';
pub const DOOR_SYMBOL: char = 'D';
pub const EXIT_PORTAL_SYMBOL: char = 'E';

/// Something drawn over a tile instead of the tile itself.
pub trait GridDisplay {
    fn render_tile(&self, coord: Cartesian2DCoordinate) -> Option<char>;
}

pub fn tile_symbol(tile: MazeTile) -> char {
    match tile {
        MazeTile::Void => VOID_SYMBOL,
        MazeTile::Room => ROOM_SYMBOL,
        MazeTile::Corridor => CORRIDOR_SYMBOL,
        MazeTile::Door => DOOR_SYMBOL,
        MazeTile::ExitPortal => EXIT_PORTAL_SYMBOL,
    }
}

pub fn symbol_tile(symbol: char) -> Option<MazeTile> {
    match symbol {
        VOID_SYMBOL => Some(MazeTile::Void),
        ROOM_SYMBOL => Some(MazeTile::Room),
        CORRIDOR_SYMBOL => Some(MazeTile::Corridor),
        DOOR_SYMBOL => Some(MazeTile::Door),
        EXIT_PORTAL_SYMBOL => Some(MazeTile::ExitPortal),
        _ => None,
    }
}

#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<Cartesian2DCoordinate>,
}
impl PathDisplay {
    pub fn new(path: &[Cartesian2DCoordinate]) -> Self {
        PathDisplay { on_path_coordinates: path.iter().cloned().collect() }
    }
}
impl GridDisplay for PathDisplay {
    fn render_tile(&self, coord: Cartesian2DCoordinate) -> Option<char> {
        if self.on_path_coordinates.contains(&coord) {
            Some('*')
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start_coordinates: CoordinateSmallVec,
    end_coordinates: CoordinateSmallVec,
}
impl StartEndPointsDisplay {
    pub fn new(starts: CoordinateSmallVec, ends: CoordinateSmallVec) -> StartEndPointsDisplay {
        StartEndPointsDisplay {
            start_coordinates: starts,
            end_coordinates: ends,
        }
    }
}
impl GridDisplay for StartEndPointsDisplay {
    fn render_tile(&self, coord: Cartesian2DCoordinate) -> Option<char> {
        let contains_coordinate =
            |coordinates: &CoordinateSmallVec| coordinates.iter().any(|&c| c == coord);

        if contains_coordinate(&self.start_coordinates) {
            Some('S')
        } else if contains_coordinate(&self.end_coordinates) {
            Some('E')
        } else {
            None
        }
    }
}

/// A tile grid with overlays. Earlier overlays win where several draw on the same tile.
pub struct TileGridDisplay<'a> {
    grid: &'a TileGrid,
    overlays: Vec<&'a dyn GridDisplay>,
}

impl<'a> TileGridDisplay<'a> {
    pub fn new(grid: &'a TileGrid) -> TileGridDisplay<'a> {
        TileGridDisplay {
            grid,
            overlays: vec![],
        }
    }

    pub fn overlay(mut self, display: &'a dyn GridDisplay) -> TileGridDisplay<'a> {
        self.overlays.push(display);
        self
    }

    fn symbol_at(&self, coord: Cartesian2DCoordinate) -> char {
        self.overlays
            .iter()
            .filter_map(|overlay| overlay.render_tile(coord))
            .next()
            .unwrap_or_else(|| tile_symbol(self.grid[coord]))
    }
}

/// One line per row, top row first.
impl<'a> fmt::Display for TileGridDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let side = self.grid.side() as u32;
        let mut output = String::with_capacity((side as usize + 1) * side as usize);
        for y in 0..side {
            for x in 0..side {
                output.push(self.symbol_at(Cartesian2DCoordinate::new(x, y)));
            }
            output.push('\n');
        }
        write!(f, "{}", output)
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", TileGridDisplay::new(self))
    }
}

/// Reads back the plain text form of a grid. Blank lines and surrounding whitespace are ignored.
pub fn parse_tile_grid(text: &str) -> Result<TileGrid> {
    let rows = text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().collect::<Vec<char>>())
        .collect::<Vec<_>>();

    let side = rows.len();
    if let Some(ragged) = rows.iter().position(|row| row.len() != side) {
        bail!(ErrorKind::InvalidDimensions(format!("row {} of a {} row grid has {} tiles",
                                                   ragged,
                                                   side,
                                                   rows[ragged].len())));
    }

    let mut tiles = Vec::with_capacity(side * side);
    for x in 0..side {
        for row in &rows {
            match symbol_tile(row[x]) {
                Some(tile) => tiles.push(tile),
                None => bail!(ErrorKind::UnknownTile(row[x])),
            }
        }
    }
    TileGrid::from_tiles(side, tiles)
}
