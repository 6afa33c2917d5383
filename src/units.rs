#[derive(Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct RoomsCount(pub usize);

/// Side length of the coarse room plan, in rooms.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct RoomPlaneSize(pub usize);

/// Side length of one room, in tiles.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct RoomSize(pub usize);

/// Side length of the fine tile grid, in tiles.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct MazeSize(pub usize);

#[derive(Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Milliseconds(pub i64);
