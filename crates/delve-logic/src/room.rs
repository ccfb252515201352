//! Placed-room model: compass directions, door sets, and room instances.
//!
//! North is +1 on the Z axis and East is +1 on the X axis. Door sets are
//! indexed in compass order `[North, East, South, West]`, so a quarter turn
//! clockwise is a cyclic right shift of the set.

use serde::{Deserialize, Serialize};

/// Stable index of an instance within one generation attempt.
pub type RoomId = u32;

/// One of the four compass directions a door can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    /// All directions in expansion order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Index into a [`DoorSet`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Grid step `(dx, dz)` for one cell in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        Direction::ALL[(self.index() + 2) % 4]
    }
}

/// Open/closed state of the four doors of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DoorSet(pub [bool; 4]);

impl DoorSet {
    /// No open doors.
    pub const SEALED: DoorSet = DoorSet([false; 4]);
    /// Every door open (a crossroads room).
    pub const ALL_OPEN: DoorSet = DoorSet([true; 4]);

    /// Build a door set from the directions that are open.
    pub fn from_open(open: &[Direction]) -> Self {
        let mut doors = [false; 4];
        for dir in open {
            doors[dir.index()] = true;
        }
        DoorSet(doors)
    }

    pub fn is_open(&self, dir: Direction) -> bool {
        self.0[dir.index()]
    }

    pub fn close(&mut self, dir: Direction) {
        self.0[dir.index()] = false;
    }

    /// Number of open doors.
    pub fn open_count(&self) -> usize {
        self.0.iter().filter(|&&open| open).count()
    }

    pub fn is_sealed(&self) -> bool {
        self.open_count() == 0
    }

    /// Directions whose door is open, in compass order.
    pub fn open_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&dir| self.is_open(dir))
            .collect()
    }

    /// Rotate the door layout a quarter turn clockwise.
    ///
    /// Each door moves to the next compass index and West wraps to North.
    pub fn rotate_clockwise(&mut self) {
        self.0.rotate_right(1);
    }
}

/// What part a placed instance plays in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomRole {
    /// The seed room at the grid center.
    Start,
    /// An ordinary room drawn from the catalog.
    Room,
    /// A corridor piece between two rooms.
    Connector,
    /// Placeholder capping a blocked door.
    DeadEnd,
    /// The unique room that completes the dungeon.
    Ending,
}

impl RoomRole {
    /// Terminal rooms never expand further.
    pub fn is_terminal(self) -> bool {
        matches!(self, RoomRole::DeadEnd | RoomRole::Ending)
    }
}

/// Which catalog entry an instance was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrototypeRef {
    Start,
    Room(usize),
    Connector(usize),
    DeadEnd,
    Ending,
}

impl PrototypeRef {
    pub fn role(self) -> RoomRole {
        match self {
            PrototypeRef::Start => RoomRole::Start,
            PrototypeRef::Room(_) => RoomRole::Room,
            PrototypeRef::Connector(_) => RoomRole::Connector,
            PrototypeRef::DeadEnd => RoomRole::DeadEnd,
            PrototypeRef::Ending => RoomRole::Ending,
        }
    }
}

/// A prototype placed on the grid during one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomInstance {
    pub id: RoomId,
    pub prototype: PrototypeRef,
    pub grid_x: i32,
    pub grid_z: i32,
    /// Doors still open for expansion.
    pub doors: DoorSet,
    /// Is a hallway between rooms.
    pub is_connector: bool,
    /// Number of placements between this instance and the start room.
    pub distance_from_start: u32,
    /// Instance this one was attached to (`None` for the start room).
    pub parent: Option<RoomId>,
    /// Direction from the parent into this instance.
    pub entered_from: Option<Direction>,
    /// World-space position `[x, y, z]`.
    pub position: [f32; 3],
    /// Accumulated clockwise yaw in degrees.
    pub yaw: f32,
}

impl RoomInstance {
    pub fn role(&self) -> RoomRole {
        self.prototype.role()
    }

    pub fn cell(&self) -> (i32, i32) {
        (self.grid_x, self.grid_z)
    }

    /// Rotate the room 90 degrees clockwise, doors and geometry together.
    pub fn rotate(&mut self) {
        self.doors.rotate_clockwise();
        self.yaw = (self.yaw + 90.0) % 360.0;
    }

    /// Turn the room until the door facing `facing` is open.
    ///
    /// Returns the number of quarter turns applied, or `None` when the room
    /// has no open door at all.
    pub fn align_door(&mut self, facing: Direction) -> Option<u8> {
        if self.doors.is_sealed() {
            return None;
        }
        let mut turns = 0;
        while !self.doors.is_open(facing) {
            self.rotate();
            turns += 1;
        }
        Some(turns)
    }
}
