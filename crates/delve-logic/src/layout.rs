//! The finished product of a successful generation run.

use crate::grid::DungeonGrid;
use crate::room::{RoomId, RoomInstance, RoomRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A completed dungeon: every placed instance plus the final occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub dungeon_size: u32,
    pub room_cell_size: f32,
    /// Indexed by [`RoomId`]; entry 0 is the start room.
    pub rooms: Vec<RoomInstance>,
    pub grid: DungeonGrid,
    /// Attempts used, including the successful one.
    pub attempts: u32,
    /// Seed that reproduces this layout.
    pub seed: u64,
}

impl DungeonLayout {
    pub fn get(&self, id: RoomId) -> Option<&RoomInstance> {
        self.rooms.get(id as usize)
    }

    /// Entry 0, or `None` for an empty (e.g. hand-built or corrupt) layout.
    pub fn start(&self) -> Option<&RoomInstance> {
        self.rooms.first()
    }

    pub fn ending(&self) -> Option<&RoomInstance> {
        self.rooms.iter().find(|r| r.role() == RoomRole::Ending)
    }

    pub fn count_role(&self, role: RoomRole) -> usize {
        self.rooms.iter().filter(|r| r.role() == role).count()
    }

    /// Instances attached directly to `id`.
    pub fn children_of(&self, id: RoomId) -> impl Iterator<Item = &RoomInstance> + '_ {
        self.rooms.iter().filter(move |r| r.parent == Some(id))
    }

    /// Chain of ids from `id` back to the start room, inclusive.
    ///
    /// Returns `None` for an unknown id or a broken parent chain.
    pub fn path_to_start(&self, id: RoomId) -> Option<Vec<RoomId>> {
        let mut path = vec![id];
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            // A chain longer than the table means a cycle
            if path.len() > self.rooms.len() {
                return None;
            }
            path.push(parent);
            current = self.get(parent)?;
        }
        Some(path)
    }

    pub fn max_distance(&self) -> u32 {
        self.rooms
            .iter()
            .map(|r| r.distance_from_start)
            .max()
            .unwrap_or(0)
    }

    fn glyph_at(&self, x: i32, z: i32) -> char {
        match self.rooms.iter().find(|r| r.cell() == (x, z)) {
            Some(room) => match room.role() {
                RoomRole::Start => 'S',
                RoomRole::Room => 'R',
                RoomRole::Connector => '+',
                RoomRole::DeadEnd => 'x',
                RoomRole::Ending => 'E',
            },
            None if self.grid.is_occupied(x, z) => '#',
            None => '.',
        }
    }
}

impl fmt::Display for DungeonLayout {
    /// ASCII map with north at the top. Claimed but empty cells show `#`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.dungeon_size as i32;
        for z in (0..size).rev() {
            for x in 0..size {
                write!(f, "{}", self.glyph_at(x, z))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
