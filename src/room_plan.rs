use bit_set::BitSet;
use log::debug;
use rand::Rng;

use crate::cells::{offset_coordinate, Cartesian2DCoordinate, CompassPrimary, DirectionMask,
                   DirectionSmallVec};
use crate::grid_dimensions::MazeDimensions;
use crate::units::{RoomPlaneSize, RoomsCount};

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum RoomPlanCell {
    Empty,
    Room,
    ExitRoom,
}

impl RoomPlanCell {
    #[inline]
    pub fn is_room(&self) -> bool {
        *self != RoomPlanCell::Empty
    }
}

/// Where the rooms of a maze sit on a coarse square grid.
///
/// Stored flat, indexed `[x][y]`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RoomPlan {
    side: usize,
    cells: Vec<RoomPlanCell>,
}

impl RoomPlan {
    pub fn new(RoomPlaneSize(side): RoomPlaneSize) -> RoomPlan {
        RoomPlan {
            side,
            cells: vec![RoomPlanCell::Empty; side * side],
        }
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn is_valid_coordinate(&self, coord: Cartesian2DCoordinate) -> bool {
        (coord.x as usize) < self.side && (coord.y as usize) < self.side
    }

    /// None outside the plan.
    pub fn get(&self, coord: Cartesian2DCoordinate) -> Option<RoomPlanCell> {
        if self.is_valid_coordinate(coord) {
            Some(self.cells[coord.column_major_index(self.side)])
        } else {
            None
        }
    }

    fn set(&mut self, coord: Cartesian2DCoordinate, cell: RoomPlanCell) {
        let index = coord.column_major_index(self.side);
        self.cells[index] = cell;
    }

    /// Every coordinate, x outer and y inner.
    pub fn iter(&self) -> impl Iterator<Item = (Cartesian2DCoordinate, RoomPlanCell)> + '_ {
        let side = self.side;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Cartesian2DCoordinate::from_column_major_index(index, side), *cell))
    }

    pub fn rooms_count(&self) -> RoomsCount {
        RoomsCount(self.cells.iter().filter(|cell| cell.is_room()).count())
    }

    pub fn exit(&self) -> Option<Cartesian2DCoordinate> {
        self.iter()
            .find(|&(_, cell)| cell == RoomPlanCell::ExitRoom)
            .map(|(coord, _)| coord)
    }

    pub fn centre(&self) -> Cartesian2DCoordinate {
        let half = (self.side / 2) as u32;
        Cartesian2DCoordinate::new(half, half)
    }

    /// Are all rooms reachable from the centre through 4-directionally adjacent rooms?
    pub fn is_connected(&self) -> bool {
        let centre = self.centre();
        if !self.get(centre).map_or(false, |cell| cell.is_room()) {
            return false;
        }

        let mut visited = BitSet::with_capacity(self.cells.len());
        visited.insert(centre.column_major_index(self.side));
        let mut frontier = vec![centre];

        while let Some(coord) = frontier.pop() {
            for dir in CompassPrimary::ALL.iter() {
                if let Some(neighbour) = offset_coordinate(coord, *dir, self.side) {
                    let index = neighbour.column_major_index(self.side);
                    if self.cells[index].is_room() && visited.insert(index) {
                        frontier.push(neighbour);
                    }
                }
            }
        }

        visited.len() == self.rooms_count().0
    }
}

struct CarveFrame {
    coord: Cartesian2DCoordinate,
    directions: DirectionSmallVec,
    next: usize,
}

/// Randomised depth first carving of rooms outwards from the plan centre.
///
/// Every room marked draws one nonzero direction mask and attempts its directions in the
/// order up, right, down, left. Each attempted neighbour that is inside the plan and still
/// empty becomes a room and is carved completely before the next direction is tried.
/// Returns the plan and how many rooms were carved.
///
/// The recursion is unrolled onto an explicit stack; masks are drawn in the same order a
/// recursive visit would draw them.
pub fn carve_room_plan<F>(dimensions: &MazeDimensions, mut mask_source: F) -> (RoomPlan, RoomsCount)
    where F: FnMut() -> DirectionMask
{
    let mut plan = RoomPlan::new(dimensions.room_plane_size());
    let side = plan.side();

    let mut mark_room = |plan: &mut RoomPlan, coord: Cartesian2DCoordinate| -> CarveFrame {
        plan.set(coord, RoomPlanCell::Room);
        CarveFrame {
            coord,
            directions: mask_source().directions(),
            next: 0,
        }
    };

    let centre = dimensions.room_plan_centre();
    let mut stack = vec![mark_room(&mut plan, centre)];
    let mut rooms_count = 1;

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.directions.len() {
            stack.pop();
            continue;
        }

        let dir = frame.directions[frame.next];
        frame.next += 1;
        let from = frame.coord;

        if let Some(neighbour) = offset_coordinate(from, dir, side) {
            if plan.get(neighbour) == Some(RoomPlanCell::Empty) {
                let neighbour_frame = mark_room(&mut plan, neighbour);
                stack.push(neighbour_frame);
                rooms_count += 1;
            }
        }
    }

    (plan, RoomsCount(rooms_count))
}

/// Carve a room plan with uniformly random nonzero direction masks.
pub fn generate_room_plan<R: Rng>(rng: &mut R, dimensions: &MazeDimensions) -> (RoomPlan, RoomsCount) {
    let (plan, rooms_count) = carve_room_plan(dimensions, || DirectionMask::random(rng));
    debug!("carved {} rooms on a {}x{} room plan", rooms_count.0, plan.side(), plan.side());
    (plan, rooms_count)
}

/// Marks the room furthest from the centre, by Manhattan distance, as the exit.
///
/// Rooms are scanned x outer, y inner and the first room found at the largest distance wins.
/// Returns None, leaving the plan untouched, if no room other than the centre exists.
pub fn place_exit_room(plan: &mut RoomPlan) -> Option<Cartesian2DCoordinate> {
    let centre = plan.centre();

    let mut furthest: Option<(Cartesian2DCoordinate, u32)> = None;
    for (coord, cell) in plan.iter() {
        if !cell.is_room() || coord == centre {
            continue;
        }
        let distance = coord.manhattan_distance(centre);
        if furthest.map_or(true, |(_, furthest_distance)| distance > furthest_distance) {
            furthest = Some((coord, distance));
        }
    }

    furthest.map(|(exit, distance)| {
        plan.set(exit, RoomPlanCell::ExitRoom);
        debug!("exit room at {:?}, {} rooms from the centre", exit, distance);
        exit
    })
}
