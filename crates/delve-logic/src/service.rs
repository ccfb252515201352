//! Placement service seam.
//!
//! The generator never talks to a scene graph directly. Whoever hosts it
//! (a game engine, an editor, a test) implements [`PlacementService`] to
//! receive each spawned room, every quarter turn applied to it, and the
//! wholesale teardown of a discarded attempt.

use crate::catalog::RoomPrototype;
use crate::room::{RoomId, RoomInstance};
use serde::{Deserialize, Serialize};

/// Receives the live side effects of generation.
pub trait PlacementService {
    /// A new instance was created at `instance.position` with zero rotation.
    fn spawn(&mut self, instance: &RoomInstance, prototype: &RoomPrototype);
    /// The instance turned a further `yaw_degrees` clockwise.
    fn rotate(&mut self, id: RoomId, yaw_degrees: f32);
    /// Destroy every instance spawned so far.
    fn clear(&mut self);
}

/// Ignores everything; for callers that only want the returned layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlacement;

impl PlacementService for NullPlacement {
    fn spawn(&mut self, _instance: &RoomInstance, _prototype: &RoomPrototype) {}
    fn rotate(&mut self, _id: RoomId, _yaw_degrees: f32) {}
    fn clear(&mut self) {}
}

/// One live instance as the host would see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub id: RoomId,
    pub prototype: String,
    pub position: [f32; 3],
    pub yaw: f32,
}

/// Keeps an in-memory scene of spawned instances.
#[derive(Debug, Default, Clone)]
pub struct RecordingPlacement {
    /// Instances alive since the last clear.
    pub live: Vec<SpawnRecord>,
    /// Total spawns across every attempt.
    pub total_spawned: usize,
    /// Total quarter turns across every attempt.
    pub total_turns: usize,
    /// Number of teardowns.
    pub clears: usize,
}

impl RecordingPlacement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, id: RoomId) -> Option<&SpawnRecord> {
        self.live.iter().find(|r| r.id == id)
    }
}

impl PlacementService for RecordingPlacement {
    fn spawn(&mut self, instance: &RoomInstance, prototype: &RoomPrototype) {
        self.live.push(SpawnRecord {
            id: instance.id,
            prototype: prototype.name.clone(),
            position: instance.position,
            yaw: 0.0,
        });
        self.total_spawned += 1;
    }

    fn rotate(&mut self, id: RoomId, yaw_degrees: f32) {
        if let Some(record) = self.live.iter_mut().rev().find(|r| r.id == id) {
            record.yaw = (record.yaw + yaw_degrees) % 360.0;
        }
        self.total_turns += 1;
    }

    fn clear(&mut self) {
        self.live.clear();
        self.clears += 1;
    }
}
