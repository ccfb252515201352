//! Generation driver: validation, the retry loop, and the result.
//!
//! ```
//! use delve_logic::config::DungeonConfig;
//! use delve_logic::generator::DungeonGenerator;
//! use delve_logic::service::NullPlacement;
//!
//! let mut config = DungeonConfig::default();
//! config.seed = Some(42);
//! let mut generator = DungeonGenerator::new(config).unwrap();
//! let layout = generator.generate(&mut NullPlacement).unwrap();
//! assert!(layout.ending().is_some());
//! ```

use crate::config::{validate_config, DungeonConfig};
use crate::decay::DecayPolicy;
use crate::error::GenerationError;
use crate::layout::DungeonLayout;
use crate::placement::{GenerationAttempt, PlacementRules};
use crate::service::PlacementService;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Where the driver currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    /// Nothing generated since construction or the last reset.
    Idle,
    /// Expanding the frontier of the current attempt.
    Running,
    /// The frontier ran dry without an ending room; the attempt is dropped.
    ExhaustedNoEnding,
    /// A layout with an ending room was produced.
    Done,
    /// The retry limit was reached.
    Failed,
}

/// Owns a validated configuration and runs generation on demand.
pub struct DungeonGenerator {
    config: DungeonConfig,
    decay: DecayPolicy,
    state: GeneratorState,
    retries: u32,
}

impl DungeonGenerator {
    /// Validate `config` up front; nothing is placed if it is rejected.
    pub fn new(config: DungeonConfig) -> Result<Self, GenerationError> {
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(GenerationError::InvalidConfig(errors));
        }
        let decay = DecayPolicy::new(config.decay_steps.clone());
        Ok(Self {
            config,
            decay,
            state: GeneratorState::Idle,
            retries: 0,
        })
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Attempts discarded during the last run.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Tear down whatever the service holds and return to `Idle`.
    pub fn reset(&mut self, service: &mut dyn PlacementService) {
        service.clear();
        self.state = GeneratorState::Idle;
        self.retries = 0;
    }

    /// Startup hook: generates only when `generate_on_start` is set.
    pub fn start(
        &mut self,
        service: &mut dyn PlacementService,
    ) -> Option<Result<DungeonLayout, GenerationError>> {
        self.config
            .generate_on_start
            .then(|| self.generate(service))
    }

    /// Generate with the configured seed, or a fresh one if none is set.
    pub fn generate(
        &mut self,
        service: &mut dyn PlacementService,
    ) -> Result<DungeonLayout, GenerationError> {
        let seed = self
            .config
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen());
        self.generate_with_seed(seed, service)
    }

    /// Regenerate from scratch with an explicit seed.
    pub fn generate_with_seed(
        &mut self,
        seed: u64,
        service: &mut dyn PlacementService,
    ) -> Result<DungeonLayout, GenerationError> {
        self.reset(service);
        let mut rng = StdRng::seed_from_u64(seed);
        let rules = PlacementRules {
            catalog: &self.config.catalog,
            decay: &self.decay,
            dungeon_size: self.config.dungeon_size,
            chain_length: self.config.chain_length,
            room_cell_size: self.config.room_cell_size,
            placement_order: self.config.placement_order,
        };

        loop {
            self.state = GeneratorState::Running;
            log::debug!("Generation attempt {} (seed {seed})", self.retries + 1);

            let mut attempt = GenerationAttempt::new(&rules);
            if let Err(e) = attempt.run(&rules, &mut rng, service) {
                service.clear();
                self.state = GeneratorState::Failed;
                log::error!("Generation aborted: {e}");
                return Err(e);
            }

            if attempt.ending_placed {
                self.state = GeneratorState::Done;
                let attempts = self.retries + 1;
                log::info!(
                    "Dungeon generated: {} instances in {attempts} attempt(s), seed {seed}",
                    attempt.instances.len()
                );
                return Ok(DungeonLayout {
                    dungeon_size: self.config.dungeon_size,
                    room_cell_size: self.config.room_cell_size,
                    rooms: attempt.instances,
                    grid: attempt.grid,
                    attempts,
                    seed,
                });
            }

            // Placed everything without an ending room: start over
            self.state = GeneratorState::ExhaustedNoEnding;
            log::warn!(
                "Attempt {} exhausted after {} placements without an ending room",
                self.retries + 1,
                attempt.rooms_placed
            );
            drop(attempt);
            service.clear();
            self.retries += 1;

            if self.retries >= self.config.retry_limit {
                self.state = GeneratorState::Failed;
                log::error!("Failed to place ending room. Change settings");
                return Err(GenerationError::RetriesExhausted {
                    attempts: self.retries,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RoomCatalog, RoomPrototype};
    use crate::decay::DecayStep;
    use crate::frontier::PlacementOrder;
    use crate::room::{Direction::*, RoomRole};
    use crate::service::{NullPlacement, RecordingPlacement};

    /// Grid too small for the chain length: every attempt exhausts.
    fn impossible_config() -> DungeonConfig {
        DungeonConfig {
            dungeon_size: 3,
            chain_length: 20,
            retry_limit: 4,
            seed: Some(1),
            ..DungeonConfig::default()
        }
    }

    fn cross_config() -> DungeonConfig {
        DungeonConfig {
            dungeon_size: 5,
            decay_steps: vec![DecayStep::new(0, 0, 999)],
            placement_order: PlacementOrder::Queue,
            chain_length: 2,
            room_cell_size: 4.0,
            retry_limit: 50,
            seed: Some(5),
            generate_on_start: false,
            catalog: RoomCatalog {
                start_room: RoomPrototype::room("start", &[North, East, South, West]),
                rooms: vec![RoomPrototype::room("cross", &[North, East, South, West])],
                connectors: vec![RoomPrototype::connector("corridor", &[North, South])],
                ending_room: RoomPrototype::room("ending", &[South]),
                dead_end_room: RoomPrototype::room("dead_end", &[South]),
            },
        }
    }

    #[test]
    fn invalid_config_rejected_before_generation() {
        let mut config = DungeonConfig::default();
        config.dungeon_size = 8;
        let err = DungeonGenerator::new(config).err().unwrap();
        assert!(matches!(err, GenerationError::InvalidConfig(ref errs) if !errs.is_empty()));
    }

    #[test]
    fn cross_config_reaches_done() {
        let mut generator = DungeonGenerator::new(cross_config()).unwrap();
        let layout = generator.generate(&mut NullPlacement).unwrap();
        assert_eq!(generator.state(), GeneratorState::Done);
        assert_eq!(layout.count_role(RoomRole::Ending), 1);
        assert_eq!(layout.ending().unwrap().distance_from_start, 4);
        assert!(layout.grid.occupied_count() >= 3);
    }

    #[test]
    fn exhaustion_fails_after_retry_limit() {
        let mut scene = RecordingPlacement::new();
        let mut generator = DungeonGenerator::new(impossible_config()).unwrap();
        let err = generator.generate(&mut scene).unwrap_err();
        assert_eq!(err, GenerationError::RetriesExhausted { attempts: 4 });
        assert_eq!(generator.state(), GeneratorState::Failed);
        // No partial dungeon left behind
        assert!(scene.live.is_empty());
        assert!(scene.total_spawned > 0);
    }

    #[test]
    fn same_seed_same_layout() {
        let mut config = DungeonConfig::default();
        config.seed = Some(1234);
        let mut a = DungeonGenerator::new(config.clone()).unwrap();
        let mut b = DungeonGenerator::new(config).unwrap();
        let la = a.generate(&mut NullPlacement).unwrap();
        let lb = b.generate(&mut NullPlacement).unwrap();
        assert_eq!(la, lb);
    }

    #[test]
    fn regenerate_clears_previous_scene() {
        let mut scene = RecordingPlacement::new();
        let mut generator = DungeonGenerator::new(cross_config()).unwrap();
        let first = generator.generate(&mut scene).unwrap();
        let second = generator.generate(&mut scene).unwrap();
        assert_eq!(first, second);
        // Start room is owned by the host and never spawned
        assert_eq!(scene.live.len(), second.rooms.len() - 1);
    }

    #[test]
    fn start_respects_flag() {
        let mut config = cross_config();
        let mut generator = DungeonGenerator::new(config.clone()).unwrap();
        assert!(generator.start(&mut NullPlacement).is_none());
        assert_eq!(generator.state(), GeneratorState::Idle);

        config.generate_on_start = true;
        let mut generator = DungeonGenerator::new(config).unwrap();
        let layout = generator.start(&mut NullPlacement).unwrap().unwrap();
        assert!(layout.ending().is_some());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut scene = RecordingPlacement::new();
        let mut generator = DungeonGenerator::new(cross_config()).unwrap();
        generator.generate(&mut scene).unwrap();
        generator.reset(&mut scene);
        assert_eq!(generator.state(), GeneratorState::Idle);
        assert!(scene.live.is_empty());
    }
}
