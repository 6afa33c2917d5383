use crate::cells::Cartesian2DCoordinate;
use crate::errors::*;
use crate::units::{MazeSize, RoomPlaneSize, RoomSize};
use error_chain::bail;

pub const ROOM_PLANE_SIZE: usize = 7;
pub const ROOM_SIZE: usize = 3;

/// The shape shared by a room plan and the tile grid compiled from it.
///
/// Rooms sit on a `room_plane_size` square. Each room expands to a `room_size` square
/// block of tiles and blocks are separated by one tile wide seams, including a seam
/// ring around the whole grid.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MazeDimensions {
    room_plane_size: RoomPlaneSize,
    room_size: RoomSize,
}

impl Default for MazeDimensions {
    fn default() -> MazeDimensions {
        MazeDimensions {
            room_plane_size: RoomPlaneSize(ROOM_PLANE_SIZE),
            room_size: RoomSize(ROOM_SIZE),
        }
    }
}

impl MazeDimensions {
    pub fn new(room_plane_size: RoomPlaneSize, room_size: RoomSize) -> Result<MazeDimensions> {
        if room_plane_size.0 < 2 {
            bail!(ErrorKind::InvalidDimensions(format!("room plane size {} leaves no room for an exit",
                                                       room_plane_size.0)));
        }
        if room_size.0 < 3 || room_size.0 % 2 == 0 {
            bail!(ErrorKind::InvalidDimensions(format!("room size {} must be odd and at least 3",
                                                       room_size.0)));
        }
        let maze_side = room_plane_size.0 * room_size.0 + room_plane_size.0 + 1;
        if maze_side > u32::MAX as usize / 2 {
            bail!(ErrorKind::InvalidDimensions(format!("maze side {} is too large", maze_side)));
        }

        Ok(MazeDimensions {
            room_plane_size,
            room_size,
        })
    }

    #[inline]
    pub fn room_plane_size(&self) -> RoomPlaneSize {
        self.room_plane_size
    }

    #[inline]
    pub fn room_size(&self) -> RoomSize {
        self.room_size
    }

    /// `room_plane_size * room_size + room_plane_size + 1`
    #[inline]
    pub fn maze_size(&self) -> MazeSize {
        let RoomPlaneSize(plane) = self.room_plane_size;
        let RoomSize(room) = self.room_size;
        MazeSize(plane * room + plane + 1)
    }

    /// Distance between the starts of two adjacent room blocks, one seam included.
    #[inline]
    pub fn seam_stride(&self) -> u32 {
        self.room_size.0 as u32 + 1
    }

    pub fn room_plan_centre(&self) -> Cartesian2DCoordinate {
        let half = (self.room_plane_size.0 / 2) as u32;
        Cartesian2DCoordinate::new(half, half)
    }

    pub fn maze_centre(&self) -> Cartesian2DCoordinate {
        let half = (self.maze_size().0 / 2) as u32;
        Cartesian2DCoordinate::new(half, half)
    }

    #[inline]
    pub fn is_seam(&self, tile: Cartesian2DCoordinate) -> bool {
        let stride = self.seam_stride();
        tile.x % stride == 0 || tile.y % stride == 0
    }

    #[inline]
    pub fn is_border(&self, tile: Cartesian2DCoordinate) -> bool {
        let last = self.maze_size().0 as u32 - 1;
        tile.x == 0 || tile.y == 0 || tile.x == last || tile.y == last
    }

    /// The room plan cell that owns a tile. Seam tiles map onto the room after them.
    #[inline]
    pub fn tile_to_room(&self, tile: Cartesian2DCoordinate) -> Cartesian2DCoordinate {
        let stride = self.seam_stride();
        Cartesian2DCoordinate::new(tile.x / stride, tile.y / stride)
    }

    /// Offset of the centre line within a block: one past the seam plus half a room.
    #[inline]
    fn block_centre_offset(&self) -> u32 {
        1 + self.room_size.0 as u32 / 2
    }

    /// The tile at the exact centre of a room's block.
    pub fn room_centre_tile(&self, room: Cartesian2DCoordinate) -> Cartesian2DCoordinate {
        let stride = self.seam_stride();
        let offset = self.block_centre_offset();
        Cartesian2DCoordinate::new(room.x * stride + offset, room.y * stride + offset)
    }

    /// Seam tiles where two rooms could be joined: on a seam line along one axis and on a
    /// block's centre line along the other, never on the outer ring.
    pub fn is_connection_candidate(&self, tile: Cartesian2DCoordinate) -> bool {
        if self.is_border(tile) {
            return false;
        }
        let stride = self.seam_stride();
        let offset = self.block_centre_offset();
        let on_centre_line = |c: u32| c % stride == offset;

        (tile.x % stride == 0 && on_centre_line(tile.y)) ||
        (tile.y % stride == 0 && on_centre_line(tile.x))
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    #[test]
    fn default_dimensions() {
        let dims = MazeDimensions::default();
        assert_eq!(dims.maze_size(), MazeSize(29));
        assert_eq!(dims.room_plan_centre(), gc(3, 3));
        assert_eq!(dims.maze_centre(), gc(14, 14));
        assert_eq!(dims.seam_stride(), 4);
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        assert!(MazeDimensions::new(RoomPlaneSize(1), RoomSize(3)).is_err());
        assert!(MazeDimensions::new(RoomPlaneSize(7), RoomSize(1)).is_err());
        assert!(MazeDimensions::new(RoomPlaneSize(7), RoomSize(4)).is_err());
        assert!(MazeDimensions::new(RoomPlaneSize(2), RoomSize(3)).is_ok());
        assert!(MazeDimensions::new(RoomPlaneSize(9), RoomSize(5)).is_ok());
    }

    #[test]
    fn seams_and_rooms() {
        let dims = MazeDimensions::default();
        assert!(dims.is_seam(gc(0, 5)));
        assert!(dims.is_seam(gc(5, 8)));
        assert!(!dims.is_seam(gc(5, 5)));
        assert_eq!(dims.tile_to_room(gc(5, 5)), gc(1, 1));
        assert_eq!(dims.tile_to_room(gc(28, 1)), gc(7, 0));
        assert_eq!(dims.room_centre_tile(gc(0, 0)), gc(2, 2));
        assert_eq!(dims.room_centre_tile(gc(3, 3)), gc(14, 14));
        assert_eq!(dims.room_centre_tile(gc(6, 6)), gc(26, 26));
    }

    #[test]
    fn connection_candidates_are_the_even_seam_tiles_for_three_tile_rooms() {
        let dims = MazeDimensions::default();
        let side = dims.maze_size().0 as u32;
        for x in 0..side {
            for y in 0..side {
                let tile = gc(x, y);
                let even_inner_seam = x % 2 == 0 && y % 2 == 0 && dims.is_seam(tile) &&
                                      !dims.is_border(tile) &&
                                      !(x % 4 == 0 && y % 4 == 0);
                assert_eq!(dims.is_connection_candidate(tile), even_inner_seam,
                           "tile {:?}", tile);
            }
        }
    }

    #[test]
    fn connection_candidates_on_larger_rooms() {
        let dims = MazeDimensions::new(RoomPlaneSize(3), RoomSize(5)).unwrap();
        assert!(dims.is_connection_candidate(gc(6, 3)));
        assert!(dims.is_connection_candidate(gc(9, 12)));
        assert!(!dims.is_connection_candidate(gc(6, 4)));
        assert!(!dims.is_connection_candidate(gc(0, 3)));
        assert!(!dims.is_connection_candidate(gc(6, 6)));
    }
}
