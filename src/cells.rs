use rand::Rng;
use smallvec::SmallVec;

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Cartesian2DCoordinate {
    pub x: u32,
    pub y: u32,
}

impl Cartesian2DCoordinate {
    pub fn new(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate { x, y }
    }

    /// Manhattan distance between two coordinates.
    pub fn manhattan_distance(&self, other: Cartesian2DCoordinate) -> u32 {
        let dx = if self.x > other.x { self.x - other.x } else { other.x - self.x };
        let dy = if self.y > other.y { self.y - other.y } else { other.y - self.y };
        dx + dy
    }

    /// Index into a flat `[x][y]` store of square side `side`.
    #[inline]
    pub fn column_major_index(&self, side: usize) -> usize {
        self.x as usize * side + self.y as usize
    }

    #[inline]
    pub fn from_column_major_index(index: usize, side: usize) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new((index / side) as u32, (index % side) as u32)
    }
}

/// Up is towards y = 0, right is towards increasing x.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CompassPrimary {
    North,
    East,
    South,
    West,
}

pub type CoordinateSmallVec = SmallVec<[Cartesian2DCoordinate; 4]>;
pub type DirectionSmallVec = SmallVec<[CompassPrimary; 4]>;

impl CompassPrimary {
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::East,
                                          CompassPrimary::South,
                                          CompassPrimary::West];

    /// The bit standing for this direction in a `DirectionMask`.
    fn mask_bit(self) -> u8 {
        match self {
            CompassPrimary::North => 0b1000,
            CompassPrimary::East => 0b0100,
            CompassPrimary::South => 0b0010,
            CompassPrimary::West => 0b0001,
        }
    }
}

/// Creates a new coordinate offset 1 cell away in the given direction.
/// Returns None if that would leave a square area of side `side`.
pub fn offset_coordinate(coord: Cartesian2DCoordinate,
                         dir: CompassPrimary,
                         side: usize)
                         -> Option<Cartesian2DCoordinate> {
    let (x, y) = (coord.x, coord.y);
    let side = side as u32;
    if x >= side || y >= side {
        return None;
    }

    match dir {
        CompassPrimary::North => {
            if y > 0 {
                Some(Cartesian2DCoordinate { x, y: y - 1 })
            } else {
                None
            }
        }
        CompassPrimary::South => {
            if y + 1 < side {
                Some(Cartesian2DCoordinate { x, y: y + 1 })
            } else {
                None
            }
        }
        CompassPrimary::East => {
            if x + 1 < side {
                Some(Cartesian2DCoordinate { x: x + 1, y })
            } else {
                None
            }
        }
        CompassPrimary::West => {
            if x > 0 {
                Some(Cartesian2DCoordinate { x: x - 1, y })
            } else {
                None
            }
        }
    }
}

/// Which of {up, right, down, left} to attempt when carving away from a room.
///
/// Never empty: at least one direction is always attempted.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct DirectionMask(u8);

impl DirectionMask {
    pub const ALL: DirectionMask = DirectionMask(0b1111);

    /// Returns None for the all-zero mask or for bits above the low nibble.
    pub fn new(bits: u8) -> Option<DirectionMask> {
        if bits == 0 || bits > 0b1111 {
            None
        } else {
            Some(DirectionMask(bits))
        }
    }

    /// Uniform draw over the 15 nonzero masks.
    pub fn random<R: Rng>(rng: &mut R) -> DirectionMask {
        DirectionMask(rng.gen_range(1..=0b1111))
    }

    #[inline]
    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, dir: CompassPrimary) -> bool {
        self.0 & dir.mask_bit() != 0
    }

    /// The set directions in carving order: up, right, down, left.
    pub fn directions(&self) -> DirectionSmallVec {
        CompassPrimary::ALL
            .iter()
            .cloned()
            .filter(|dir| self.contains(*dir))
            .collect()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    #[test]
    fn offsets_stay_inside_the_area() {
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        let check_neighbours = |coord, neighbour_opts: &[Option<Cartesian2DCoordinate>]| {
            let neighbour_options = CompassPrimary::ALL
                .iter()
                .map(|dir| offset_coordinate(coord, *dir, 3))
                .collect::<Vec<_>>();
            assert_eq!(&neighbour_options[..], neighbour_opts);
        };

        check_neighbours(gc(0, 0), &[None, Some(gc(1, 0)), Some(gc(0, 1)), None]);
        check_neighbours(gc(2, 2), &[Some(gc(2, 1)), None, None, Some(gc(1, 2))]);
        check_neighbours(gc(1, 1),
                         &[Some(gc(1, 0)), Some(gc(2, 1)), Some(gc(1, 2)), Some(gc(0, 1))]);
        check_neighbours(gc(3, 1), &[None, None, None, None]);
    }

    #[test]
    fn manhattan_distance() {
        let centre = Cartesian2DCoordinate::new(3, 3);
        assert_eq!(centre.manhattan_distance(centre), 0);
        assert_eq!(centre.manhattan_distance(Cartesian2DCoordinate::new(0, 0)), 6);
        assert_eq!(Cartesian2DCoordinate::new(6, 1).manhattan_distance(centre), 5);
    }

    #[test]
    fn column_major_indices() {
        let coord = Cartesian2DCoordinate::new(2, 5);
        let index = coord.column_major_index(7);
        assert_eq!(index, 19);
        assert_eq!(Cartesian2DCoordinate::from_column_major_index(index, 7), coord);
    }

    #[test]
    fn zero_mask_is_rejected() {
        assert_eq!(DirectionMask::new(0), None);
        assert_eq!(DirectionMask::new(0b1_0000), None);
        assert_eq!(DirectionMask::new(0b1111), Some(DirectionMask::ALL));
    }

    #[test]
    fn mask_directions_follow_carving_order() {
        let all = DirectionMask::ALL.directions();
        assert_eq!(&*all, &CompassPrimary::ALL[..]);

        let up_and_left = DirectionMask::new(0b1001).unwrap().directions();
        assert_eq!(&*up_and_left, &[CompassPrimary::North, CompassPrimary::West]);

        let right_and_down = DirectionMask::new(0b0110).unwrap().directions();
        assert_eq!(&*right_and_down, &[CompassPrimary::East, CompassPrimary::South]);
    }

    #[test]
    fn random_masks_are_never_empty() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        let mut seen = [false; 16];
        for _ in 0..2000 {
            let mask = DirectionMask::random(&mut rng);
            assert!(mask.bits() >= 1 && mask.bits() <= 0b1111);
            assert!(!mask.directions().is_empty());
            seen[mask.bits() as usize] = true;
        }
        assert!(!seen[0]);
        assert!(seen[1..].iter().all(|s| *s));
    }
}
