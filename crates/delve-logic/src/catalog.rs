//! Room prototypes and the catalog they are drawn from.
//!
//! Ordinary rooms are ordered from fewest to most doors so that the decay
//! policy can narrow selection toward simpler rooms as the dungeon grows.

use crate::room::{Direction, DoorSet, PrototypeRef};
use serde::{Deserialize, Serialize};

/// A room template: its door layout before any rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPrototype {
    pub name: String,
    pub doors: DoorSet,
    #[serde(default)]
    pub is_connector: bool,
}

impl RoomPrototype {
    pub fn room(name: &str, open: &[Direction]) -> Self {
        Self {
            name: name.to_string(),
            doors: DoorSet::from_open(open),
            is_connector: false,
        }
    }

    pub fn connector(name: &str, open: &[Direction]) -> Self {
        Self {
            name: name.to_string(),
            doors: DoorSet::from_open(open),
            is_connector: true,
        }
    }
}

/// Every prototype a generation run can place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomCatalog {
    /// The seed room at the grid center.
    pub start_room: RoomPrototype,
    /// Ordinary rooms, lowest to highest door count.
    pub rooms: Vec<RoomPrototype>,
    /// Corridor pieces; one is drawn uniformly after every ordinary room.
    pub connectors: Vec<RoomPrototype>,
    pub ending_room: RoomPrototype,
    pub dead_end_room: RoomPrototype,
}

impl RoomCatalog {
    /// Look up the prototype behind a reference.
    pub fn get(&self, proto: PrototypeRef) -> Option<&RoomPrototype> {
        match proto {
            PrototypeRef::Start => Some(&self.start_room),
            PrototypeRef::Room(i) => self.rooms.get(i),
            PrototypeRef::Connector(i) => self.connectors.get(i),
            PrototypeRef::DeadEnd => Some(&self.dead_end_room),
            PrototypeRef::Ending => Some(&self.ending_room),
        }
    }

    /// All prototypes with their references, for validation.
    pub fn entries(&self) -> Vec<(PrototypeRef, &RoomPrototype)> {
        let mut out = vec![(PrototypeRef::Start, &self.start_room)];
        out.extend(
            self.rooms
                .iter()
                .enumerate()
                .map(|(i, p)| (PrototypeRef::Room(i), p)),
        );
        out.extend(
            self.connectors
                .iter()
                .enumerate()
                .map(|(i, p)| (PrototypeRef::Connector(i), p)),
        );
        out.push((PrototypeRef::Ending, &self.ending_room));
        out.push((PrototypeRef::DeadEnd, &self.dead_end_room));
        out
    }
}

impl Default for RoomCatalog {
    /// Reference catalog: cap, corner, straight, junction, and crossroads
    /// rooms with straight and bent corridors.
    fn default() -> Self {
        use Direction::*;
        Self {
            start_room: RoomPrototype::room("start", &[North, East, South, West]),
            rooms: vec![
                RoomPrototype::room("cap", &[South]),
                RoomPrototype::room("corner", &[South, East]),
                RoomPrototype::room("hall", &[North, South]),
                RoomPrototype::room("junction", &[East, South, West]),
                RoomPrototype::room("crossroads", &[North, East, South, West]),
            ],
            connectors: vec![
                RoomPrototype::connector("corridor", &[North, South]),
                RoomPrototype::connector("bend", &[South, East]),
            ],
            ending_room: RoomPrototype::room("ending", &[South]),
            dead_end_room: RoomPrototype::room("dead_end", &[South]),
        }
    }
}
