//! Frontier-driven room placement for a single generation attempt.
//!
//! A [`GenerationAttempt`] owns everything one run touches: the occupancy
//! grid, the frontier, and the instance table. The driver creates a fresh
//! attempt for every retry, so nothing leaks from a discarded layout into
//! the next one.
//!
//! # Selection rules
//!
//! For a parent expanding through an open door into target cell `t`, with
//! the cell beyond it as lookahead `l`:
//!
//! 1. `t` off the grid or already holding an instance: the door is sealed.
//! 2. Ordinary parent and `t` claimed, or `l` off the grid or claimed: a
//!    dead-end room.
//! 3. Ordinary parent otherwise: a random connector.
//! 4. Connector parent at or past the chain length, ending not yet placed:
//!    the ending room.
//! 5. Connector parent otherwise: a catalog room from the decay range.

use crate::catalog::RoomCatalog;
use crate::decay::DecayPolicy;
use crate::error::GenerationError;
use crate::frontier::{Frontier, PlacementOrder};
use crate::grid::DungeonGrid;
use crate::room::{Direction, PrototypeRef, RoomId, RoomInstance};
use crate::service::PlacementService;
use rand::Rng;
use std::collections::HashMap;

/// Read-only inputs shared by every attempt of one generation run.
pub struct PlacementRules<'a> {
    pub catalog: &'a RoomCatalog,
    pub decay: &'a DecayPolicy,
    pub dungeon_size: u32,
    pub chain_length: u32,
    pub room_cell_size: f32,
    pub placement_order: PlacementOrder,
}

/// What one open door turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    Placed(RoomId),
    /// Nothing fits; the door was closed in place.
    Sealed,
}

/// State of one attempt: grid, frontier, and placed instances.
pub struct GenerationAttempt {
    pub grid: DungeonGrid,
    frontier: Box<dyn Frontier<RoomId>>,
    pub instances: Vec<RoomInstance>,
    /// Which instance stands on each cell.
    cells: HashMap<(i32, i32), RoomId>,
    /// Placements so far; drives the decay schedule.
    pub rooms_placed: u32,
    pub ending_placed: bool,
}

impl GenerationAttempt {
    /// Seed a new attempt with the start room at the grid center.
    pub fn new(rules: &PlacementRules<'_>) -> Self {
        let grid = DungeonGrid::new(rules.dungeon_size);
        let (cx, cz) = grid.center();
        let start_proto = &rules.catalog.start_room;
        let start = RoomInstance {
            id: 0,
            prototype: PrototypeRef::Start,
            grid_x: cx,
            grid_z: cz,
            doors: start_proto.doors,
            is_connector: start_proto.is_connector,
            distance_from_start: 0,
            parent: None,
            entered_from: None,
            position: [0.0, 0.0, 0.0],
            yaw: 0.0,
        };

        let mut frontier = rules.placement_order.frontier();
        frontier.insert(start.id);

        let mut cells = HashMap::new();
        cells.insert((cx, cz), start.id);

        Self {
            grid,
            frontier,
            instances: vec![start],
            cells,
            rooms_placed: 0,
            ending_placed: false,
        }
    }

    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    pub fn instance_at(&self, x: i32, z: i32) -> Option<&RoomInstance> {
        self.cells
            .get(&(x, z))
            .map(|&id| &self.instances[id as usize])
    }

    /// Pop one frontier entry and try all four of its doors.
    ///
    /// Returns `Ok(false)` once the frontier is exhausted.
    pub fn step(
        &mut self,
        rules: &PlacementRules<'_>,
        rng: &mut impl Rng,
        service: &mut dyn PlacementService,
    ) -> Result<bool, GenerationError> {
        let Some(id) = self.frontier.remove_next() else {
            return Ok(false);
        };
        for dir in Direction::ALL {
            if self.instances[id as usize].doors.is_open(dir) {
                self.attempt_placement_at(rules, rng, service, id, dir)?;
            }
        }
        Ok(true)
    }

    /// Expand until the frontier is empty.
    pub fn run(
        &mut self,
        rules: &PlacementRules<'_>,
        rng: &mut impl Rng,
        service: &mut dyn PlacementService,
    ) -> Result<(), GenerationError> {
        while self.step(rules, rng, service)? {}
        Ok(())
    }

    /// Resolve one open door of `parent_id`.
    pub fn attempt_placement_at(
        &mut self,
        rules: &PlacementRules<'_>,
        rng: &mut impl Rng,
        service: &mut dyn PlacementService,
        parent_id: RoomId,
        dir: Direction,
    ) -> Result<PlacementOutcome, GenerationError> {
        let parent = &self.instances[parent_id as usize];
        let (dx, dz) = dir.offset();
        let (x_new, z_new) = (parent.grid_x + dx, parent.grid_z + dz);

        let Some(chosen) = self.choose_prototype(rules, rng, parent_id, x_new, z_new, dir) else {
            self.instances[parent_id as usize].doors.close(dir);
            return Ok(PlacementOutcome::Sealed);
        };

        let id = self.place_new_room(rules, service, chosen, parent_id, dir, x_new, z_new)?;
        self.rooms_placed += 1;
        Ok(PlacementOutcome::Placed(id))
    }

    /// Pick what goes on `(x_new, z_new)`, or `None` to seal the door.
    fn choose_prototype(
        &mut self,
        rules: &PlacementRules<'_>,
        rng: &mut impl Rng,
        parent_id: RoomId,
        x_new: i32,
        z_new: i32,
        dir: Direction,
    ) -> Option<PrototypeRef> {
        if !self.grid.in_bounds(x_new, z_new) || self.cells.contains_key(&(x_new, z_new)) {
            return None;
        }

        let parent = &self.instances[parent_id as usize];
        let (dx, dz) = dir.offset();
        let (x_ahead, z_ahead) = (x_new + dx, z_new + dz);

        if !parent.is_connector {
            // A connector here would have nowhere to lead
            let blocked = self.grid.is_occupied(x_new, z_new)
                || !self.grid.in_bounds(x_ahead, z_ahead)
                || self.grid.is_occupied(x_ahead, z_ahead);
            if blocked {
                return Some(PrototypeRef::DeadEnd);
            }
            // Connectors must follow a room
            let pick = rng.gen_range(0..rules.catalog.connectors.len());
            return Some(PrototypeRef::Connector(pick));
        }

        if !self.ending_placed && parent.distance_from_start >= rules.chain_length {
            self.ending_placed = true;
            return Some(PrototypeRef::Ending);
        }

        let index = rules.decay.sample(rng, self.rooms_placed);
        Some(PrototypeRef::Room(index))
    }

    #[allow(clippy::too_many_arguments)]
    fn place_new_room(
        &mut self,
        rules: &PlacementRules<'_>,
        service: &mut dyn PlacementService,
        chosen: PrototypeRef,
        parent_id: RoomId,
        dir: Direction,
        x_new: i32,
        z_new: i32,
    ) -> Result<RoomId, GenerationError> {
        let proto = rules.catalog.get(chosen).ok_or_else(|| {
            GenerationError::InvalidPrototype(format!("{chosen:?} is not in the catalog"))
        })?;
        let parent = &self.instances[parent_id as usize];
        let (dx, dz) = dir.offset();

        let id = self.instances.len() as RoomId;
        let mut room = RoomInstance {
            id,
            prototype: chosen,
            grid_x: x_new,
            grid_z: z_new,
            doors: proto.doors,
            is_connector: proto.is_connector,
            distance_from_start: parent.distance_from_start + 1,
            parent: Some(parent_id),
            entered_from: Some(dir),
            position: [
                parent.position[0] + dx as f32 * rules.room_cell_size,
                0.0,
                parent.position[2] + dz as f32 * rules.room_cell_size,
            ],
            yaw: 0.0,
        };
        service.spawn(&room, proto);

        self.grid.occupy(x_new, z_new);
        let (x_ahead, z_ahead) = (x_new + dx, z_new + dz);
        if room.is_connector && self.grid.is_interior(x_ahead, z_ahead) {
            // Claim the space ahead so another branch can't take it
            self.grid.occupy(x_ahead, z_ahead);
        }

        let facing = dir.opposite();
        let turns = room
            .align_door(facing)
            .ok_or_else(|| GenerationError::InvalidPrototype(proto.name.clone()))?;
        for _ in 0..turns {
            service.rotate(id, 90.0);
        }
        room.doors.close(facing);

        self.cells.insert((x_new, z_new), id);
        self.instances.push(room);
        self.frontier.insert(id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RoomPrototype;
    use crate::decay::DecayStep;
    use crate::room::{DoorSet, RoomRole};
    use crate::service::{NullPlacement, RecordingPlacement};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use Direction::*;

    fn cross_catalog() -> RoomCatalog {
        RoomCatalog {
            start_room: RoomPrototype::room("start", &[North, East, South, West]),
            rooms: vec![RoomPrototype::room("cross", &[North, East, South, West])],
            connectors: vec![RoomPrototype::connector("corridor", &[North, South])],
            ending_room: RoomPrototype::room("ending", &[South]),
            dead_end_room: RoomPrototype::room("dead_end", &[South]),
        }
    }

    fn rules<'a>(catalog: &'a RoomCatalog, decay: &'a DecayPolicy, size: u32) -> PlacementRules<'a> {
        PlacementRules {
            catalog,
            decay,
            dungeon_size: size,
            chain_length: 2,
            room_cell_size: 10.0,
            placement_order: PlacementOrder::Queue,
        }
    }

    fn single_step_decay() -> DecayPolicy {
        DecayPolicy::new(vec![DecayStep::new(0, 0, 1000)])
    }

    #[test]
    fn new_attempt_seeds_center() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let attempt = GenerationAttempt::new(&rules(&catalog, &decay, 7));
        assert_eq!(attempt.grid.occupied_count(), 1);
        assert_eq!(attempt.instances.len(), 1);
        assert_eq!(attempt.instances[0].cell(), (3, 3));
        assert_eq!(attempt.pending(), 1);
        assert_eq!(attempt.rooms_placed, 0);
    }

    #[test]
    fn room_parent_places_connector_and_claims_ahead() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 7);
        let mut attempt = GenerationAttempt::new(&rules);
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 0, North)
            .unwrap();
        let PlacementOutcome::Placed(id) = outcome else {
            panic!("expected placement, got {outcome:?}");
        };
        let corridor = &attempt.instances[id as usize];
        assert_eq!(corridor.role(), RoomRole::Connector);
        assert_eq!(corridor.cell(), (3, 4));
        assert_eq!(corridor.distance_from_start, 1);
        assert_eq!(corridor.position, [0.0, 0.0, 10.0]);
        // Door back to the start is consumed; the forward door stays open
        assert!(!corridor.doors.is_open(South));
        assert!(corridor.doors.is_open(North));
        // Target plus the claimed cell ahead
        assert!(attempt.grid.is_occupied(3, 4));
        assert!(attempt.grid.is_occupied(3, 5));
        assert_eq!(attempt.rooms_placed, 1);
    }

    #[test]
    fn claim_skipped_on_border() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 5);
        let mut attempt = GenerationAttempt::new(&rules);
        let mut rng = StdRng::seed_from_u64(1);

        attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 0, East)
            .unwrap();
        // Connector at (3,2); cell ahead (4,2) is on the border
        assert!(attempt.grid.is_occupied(3, 2));
        assert!(!attempt.grid.is_occupied(4, 2));
        assert_eq!(attempt.grid.occupied_count(), 2);
    }

    #[test]
    fn connector_is_rotated_to_face_parent() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 7);
        let mut attempt = GenerationAttempt::new(&rules);
        let mut rng = StdRng::seed_from_u64(1);
        let mut scene = RecordingPlacement::new();

        let PlacementOutcome::Placed(id) = attempt
            .attempt_placement_at(&rules, &mut rng, &mut scene, 0, East)
            .unwrap()
        else {
            panic!("expected placement");
        };
        // N/S corridor turned once to run W/E
        let corridor = &attempt.instances[id as usize];
        assert!((corridor.yaw - 90.0).abs() < 0.01);
        assert!(corridor.doors.is_open(East));
        assert!(!corridor.doors.is_open(West));
        assert!((scene.find(id).unwrap().yaw - 90.0).abs() < 0.01);
    }

    #[test]
    fn connector_parent_places_catalog_room() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 9);
        let mut attempt = GenerationAttempt::new(&rules);
        let mut rng = StdRng::seed_from_u64(1);

        attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 0, North)
            .unwrap();
        let PlacementOutcome::Placed(room) = attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 1, North)
            .unwrap()
        else {
            panic!("expected placement");
        };
        let room = &attempt.instances[room as usize];
        assert_eq!(room.prototype, PrototypeRef::Room(0));
        assert_eq!(room.cell(), (4, 6));
        assert_eq!(room.distance_from_start, 2);
        assert_eq!(room.parent, Some(1));
    }

    #[test]
    fn ending_room_after_chain_length() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 11);
        let mut attempt = GenerationAttempt::new(&rules);
        let mut rng = StdRng::seed_from_u64(1);
        let mut parent = 0;
        // start → connector → room → connector → ending
        for _ in 0..4 {
            let PlacementOutcome::Placed(id) = attempt
                .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, parent, North)
                .unwrap()
            else {
                panic!("expected placement");
            };
            parent = id;
        }
        let last = &attempt.instances[parent as usize];
        assert_eq!(last.role(), RoomRole::Ending);
        assert_eq!(last.distance_from_start, 4);
        assert!(attempt.ending_placed);
        assert!(last.doors.is_sealed());
    }

    #[test]
    fn blocked_lookahead_gives_dead_end() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 5);
        let mut attempt = GenerationAttempt::new(&rules);
        attempt.grid.occupy(2, 4);
        let mut rng = StdRng::seed_from_u64(1);

        let PlacementOutcome::Placed(id) = attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 0, North)
            .unwrap()
        else {
            panic!("expected placement");
        };
        let dead_end = &attempt.instances[id as usize];
        assert_eq!(dead_end.role(), RoomRole::DeadEnd);
        assert!(dead_end.doors.is_sealed());
    }

    #[test]
    fn off_grid_door_is_sealed() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 3);
        let mut attempt = GenerationAttempt::new(&rules);
        attempt.instances[0].grid_z = 2;
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 0, North)
            .unwrap();
        assert_eq!(outcome, PlacementOutcome::Sealed);
        assert!(!attempt.instances[0].doors.is_open(North));
        assert_eq!(attempt.rooms_placed, 0);
    }

    #[test]
    fn door_onto_existing_instance_is_sealed() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 7);
        let mut attempt = GenerationAttempt::new(&rules);
        let mut rng = StdRng::seed_from_u64(1);
        let mut scene = RecordingPlacement::new();

        attempt
            .attempt_placement_at(&rules, &mut rng, &mut scene, 0, East)
            .unwrap();
        assert!(attempt.instance_at(4, 3).is_some());
        // The start's east door is still open and now faces the corridor
        assert!(attempt.instances[0].doors.is_open(East));

        let outcome = attempt
            .attempt_placement_at(&rules, &mut rng, &mut scene, 0, East)
            .unwrap();
        assert_eq!(outcome, PlacementOutcome::Sealed);
        assert!(!attempt.instances[0].doors.is_open(East));
        assert_eq!(attempt.rooms_placed, 1);
        assert_eq!(attempt.instances.len(), 2);
        assert_eq!(scene.total_spawned, 1);
    }

    #[test]
    fn connector_builds_onto_claimed_cell() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 5);
        let mut attempt = GenerationAttempt::new(&rules);
        let mut rng = StdRng::seed_from_u64(1);

        // Corridor at (2,3); its lookahead (2,4) is on the border and unclaimed
        attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 0, North)
            .unwrap();
        assert!(!attempt.grid.is_occupied(2, 4));
        // Another branch claims the cell without placing anything on it
        attempt.grid.occupy(2, 4);
        assert!(attempt.instance_at(2, 4).is_none());

        let PlacementOutcome::Placed(id) = attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 1, North)
            .unwrap()
        else {
            panic!("claimed cell should still take a room");
        };
        let room = &attempt.instances[id as usize];
        assert_eq!(room.prototype, PrototypeRef::Room(0));
        assert_eq!(room.cell(), (2, 4));
        assert_eq!(attempt.instance_at(2, 4).map(|r| r.id), Some(id));
        assert_eq!(attempt.rooms_placed, 2);
    }

    #[test]
    fn connector_places_ending_onto_claimed_cell() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let mut rules = rules(&catalog, &decay, 5);
        rules.chain_length = 1;
        let mut attempt = GenerationAttempt::new(&rules);
        let mut rng = StdRng::seed_from_u64(1);

        attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 0, North)
            .unwrap();
        attempt.grid.occupy(2, 4);

        let PlacementOutcome::Placed(id) = attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 1, North)
            .unwrap()
        else {
            panic!("claimed cell should still take the ending");
        };
        assert_eq!(attempt.instances[id as usize].role(), RoomRole::Ending);
        assert!(attempt.ending_placed);
    }

    #[test]
    fn sealed_prototype_is_an_error() {
        let mut catalog = cross_catalog();
        catalog.connectors[0].doors = DoorSet::SEALED;
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 7);
        let mut attempt = GenerationAttempt::new(&rules);
        let mut rng = StdRng::seed_from_u64(1);

        let err = attempt
            .attempt_placement_at(&rules, &mut rng, &mut NullPlacement, 0, North)
            .unwrap_err();
        assert_eq!(err, GenerationError::InvalidPrototype("corridor".into()));
    }

    #[test]
    fn run_exhausts_frontier() {
        let catalog = cross_catalog();
        let decay = single_step_decay();
        let rules = rules(&catalog, &decay, 7);
        let mut attempt = GenerationAttempt::new(&rules);
        let mut rng = StdRng::seed_from_u64(3);

        attempt.run(&rules, &mut rng, &mut NullPlacement).unwrap();
        assert_eq!(attempt.pending(), 0);
        assert_eq!(attempt.instances.len() as u32, attempt.rooms_placed + 1);
        // No child can expand back toward its parent
        for room in attempt.instances.iter().skip(1) {
            let entered = room.entered_from.unwrap();
            assert!(!room.doors.is_open(entered.opposite()));
        }
    }
}
