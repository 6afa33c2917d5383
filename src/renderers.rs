use error_chain::bail;
use image::{Rgb, RgbImage};
use log::info;
use std::path::{Path, PathBuf};

use crate::cells::Cartesian2DCoordinate;
use crate::errors::*;
use crate::tile_grid::{MazeTile, TileGrid};
use crate::utils::{self, FnvHashSet};

pub const DEFAULT_TILE_PIXELS: u32 = 12;

const VOID_COLOUR: Rgb<u8> = Rgb([0x20, 0x20, 0x20]);
const ROOM_COLOUR: Rgb<u8> = Rgb([0xe6, 0xe6, 0xe6]);
const CORRIDOR_COLOUR: Rgb<u8> = Rgb([0xc8, 0xb4, 0x8c]);
const DOOR_COLOUR: Rgb<u8> = Rgb([0x8b, 0x45, 0x13]);
const EXIT_PORTAL_COLOUR: Rgb<u8> = Rgb([0x1e, 0x64, 0xff]);
const START_COLOUR: Rgb<u8> = Rgb([0x00, 0xc8, 0x00]);
const END_COLOUR: Rgb<u8> = Rgb([0xdc, 0x00, 0x00]);
const PATH_COLOUR: Rgb<u8> = Rgb([0xff, 0xd7, 0x00]);

#[derive(Debug, Clone)]
pub struct RenderOptions {
    tile_pixels: u32,
    mark_start_end: bool,
    start: Option<Cartesian2DCoordinate>,
    end: Option<Cartesian2DCoordinate>,
    show_path: bool,
    path: Option<Vec<Cartesian2DCoordinate>>,
    output_file: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            tile_pixels: DEFAULT_TILE_PIXELS,
            mark_start_end: false,
            start: None,
            end: None,
            show_path: false,
            path: None,
            output_file: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptionsBuilder {
    options: RenderOptions,
}

impl RenderOptionsBuilder {
    pub fn new() -> RenderOptionsBuilder {
        RenderOptionsBuilder::default()
    }
    pub fn tile_pixels(mut self, pixels: u32) -> RenderOptionsBuilder {
        self.options.tile_pixels = pixels;
        self
    }
    pub fn mark_start_end(mut self, on: bool) -> RenderOptionsBuilder {
        self.options.mark_start_end = on;
        self
    }
    pub fn start(mut self, start: Option<Cartesian2DCoordinate>) -> RenderOptionsBuilder {
        self.options.start = start;
        self
    }
    pub fn end(mut self, end: Option<Cartesian2DCoordinate>) -> RenderOptionsBuilder {
        self.options.end = end;
        self
    }
    pub fn show_path(mut self, on: bool) -> RenderOptionsBuilder {
        self.options.show_path = on;
        self
    }
    pub fn path(mut self, path: Option<Vec<Cartesian2DCoordinate>>) -> RenderOptionsBuilder {
        self.options.path = path;
        self
    }
    pub fn output_file(mut self, output_file: Option<&Path>) -> RenderOptionsBuilder {
        self.options.output_file = output_file.map(Path::to_path_buf);
        self
    }
    pub fn build(self) -> RenderOptions {
        self.options
    }
}

pub fn tile_colour(tile: MazeTile) -> Rgb<u8> {
    match tile {
        MazeTile::Void => VOID_COLOUR,
        MazeTile::Room => ROOM_COLOUR,
        MazeTile::Corridor => CORRIDOR_COLOUR,
        MazeTile::Door => DOOR_COLOUR,
        MazeTile::ExitPortal => EXIT_PORTAL_COLOUR,
    }
}

/// Draws a top down map of the grid, one square block of pixels per tile, and saves it as a PNG
/// when an output file is set.
///
/// Path tiles get a marker in the middle third of their block. Start and end markers cover
/// the middle half of theirs and are drawn last.
pub fn render_tile_grid(grid: &TileGrid, options: &RenderOptions) -> Result<RgbImage> {
    let tile_pixels = options.tile_pixels;
    if tile_pixels == 0 {
        bail!(ErrorKind::InvalidDimensions("tiles must be at least one pixel wide".to_owned()));
    }
    let image_side = grid.side() as u32 * tile_pixels;
    let mut image = RgbImage::new(image_side, image_side);

    for (coord, tile) in grid.iter() {
        fill_tile(&mut image, coord, tile_pixels, 0, tile_colour(tile));
    }

    if options.show_path {
        if let Some(ref path) = options.path {
            let on_path: FnvHashSet<Cartesian2DCoordinate> = {
                let mut set = utils::fnv_hashset(path.len());
                set.extend(path.iter().cloned());
                set
            };
            for &coord in &on_path {
                if grid.is_valid_coordinate(coord) {
                    fill_tile(&mut image, coord, tile_pixels, tile_pixels / 3, PATH_COLOUR);
                }
            }
        }
    }

    if options.mark_start_end {
        let markers = [(options.start, START_COLOUR), (options.end, END_COLOUR)];
        for &(marker, colour) in markers.iter() {
            if let Some(coord) = marker.filter(|&c| grid.is_valid_coordinate(c)) {
                fill_tile(&mut image, coord, tile_pixels, tile_pixels / 4, colour);
            }
        }
    }

    if let Some(ref file_name) = options.output_file {
        image.save(file_name)?;
        info!("wrote {}x{} map to {}", image_side, image_side, file_name.display());
    }

    Ok(image)
}

fn fill_tile(image: &mut RgbImage,
             coord: Cartesian2DCoordinate,
             tile_pixels: u32,
             inset: u32,
             colour: Rgb<u8>) {
    let x1 = coord.x * tile_pixels + inset;
    let y1 = coord.y * tile_pixels + inset;
    let x2 = (coord.x + 1) * tile_pixels - inset;
    let y2 = (coord.y + 1) * tile_pixels - inset;
    for x in x1..x2 {
        for y in y1..y2 {
            image.put_pixel(x, y, colour);
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::grid_displays::parse_tile_grid;

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    const SMALL: &str = "\
#####
#.,E#
#D###
#..##
#####
";

    fn centre_pixel(image: &RgbImage, coord: Cartesian2DCoordinate, tile_pixels: u32) -> Rgb<u8> {
        *image.get_pixel(coord.x * tile_pixels + tile_pixels / 2,
                         coord.y * tile_pixels + tile_pixels / 2)
    }

    #[test]
    fn one_block_per_tile() {
        let grid = parse_tile_grid(SMALL).unwrap();
        let options = RenderOptionsBuilder::new().tile_pixels(8).build();
        let image = render_tile_grid(&grid, &options).unwrap();

        assert_eq!(image.dimensions(), (40, 40));
        assert_eq!(centre_pixel(&image, gc(0, 0), 8), VOID_COLOUR);
        assert_eq!(centre_pixel(&image, gc(1, 1), 8), ROOM_COLOUR);
        assert_eq!(centre_pixel(&image, gc(2, 1), 8), CORRIDOR_COLOUR);
        assert_eq!(centre_pixel(&image, gc(3, 1), 8), EXIT_PORTAL_COLOUR);
        assert_eq!(centre_pixel(&image, gc(1, 2), 8), DOOR_COLOUR);
        assert_eq!(*image.get_pixel(15, 15), ROOM_COLOUR);
        assert_eq!(*image.get_pixel(16, 8), CORRIDOR_COLOUR);
    }

    #[test]
    fn overlays_are_drawn_inside_tiles() {
        let grid = parse_tile_grid(SMALL).unwrap();
        let options = RenderOptionsBuilder::new()
            .tile_pixels(12)
            .mark_start_end(true)
            .start(Some(gc(1, 3)))
            .end(Some(gc(3, 1)))
            .show_path(true)
            .path(Some(vec![gc(1, 3), gc(1, 2), gc(1, 1), gc(2, 1), gc(3, 1)]))
            .build();
        let image = render_tile_grid(&grid, &options).unwrap();

        assert_eq!(centre_pixel(&image, gc(1, 3), 12), START_COLOUR);
        assert_eq!(centre_pixel(&image, gc(3, 1), 12), END_COLOUR);
        assert_eq!(centre_pixel(&image, gc(1, 2), 12), PATH_COLOUR);
        assert_eq!(centre_pixel(&image, gc(2, 3), 12), ROOM_COLOUR);
        // Block corners keep the tile colour.
        assert_eq!(*image.get_pixel(12, 24), DOOR_COLOUR);
    }

    #[test]
    fn path_hidden_unless_shown() {
        let grid = parse_tile_grid(SMALL).unwrap();
        let options = RenderOptionsBuilder::new()
            .path(Some(vec![gc(1, 1)]))
            .build();
        let image = render_tile_grid(&grid, &options).unwrap();
        assert_eq!(centre_pixel(&image, gc(1, 1), DEFAULT_TILE_PIXELS), ROOM_COLOUR);
    }

    #[test]
    fn zero_pixel_tiles_are_rejected() {
        let grid = parse_tile_grid(SMALL).unwrap();
        let options = RenderOptionsBuilder::new().tile_pixels(0).build();
        assert!(render_tile_grid(&grid, &options).is_err());
    }

    #[test]
    fn saves_png() {
        let grid = parse_tile_grid(SMALL).unwrap();
        let file_name = std::env::temp_dir().join(format!("mathmaze-render-{}.png", std::process::id()));
        let options = RenderOptionsBuilder::new()
            .tile_pixels(4)
            .output_file(Some(&file_name))
            .build();
        render_tile_grid(&grid, &options).unwrap();

        let written = std::fs::read(&file_name).unwrap();
        std::fs::remove_file(&file_name).unwrap();
        assert_eq!(&written[1..4], b"PNG");
    }
}
