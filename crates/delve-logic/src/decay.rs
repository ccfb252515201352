//! Room-complexity decay.
//!
//! Each step allows catalog indices `lower_index..=upper_index` until
//! `decay_at` rooms have been placed. Since the catalog is ordered from
//! fewest to most doors, later steps with lower indices taper the branching
//! and let the dungeon close off.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One increment of the decay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayStep {
    pub lower_index: usize,
    pub upper_index: usize,
    /// Placement count at which this step stops applying.
    pub decay_at: u32,
}

impl DecayStep {
    pub fn new(lower_index: usize, upper_index: usize, decay_at: u32) -> Self {
        Self {
            lower_index,
            upper_index,
            decay_at,
        }
    }
}

/// Maps the running placement count to an allowed catalog index range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayPolicy {
    steps: Vec<DecayStep>,
}

impl DecayPolicy {
    /// Steps are expected in ascending `decay_at` order; see
    /// [`validate_config`](crate::config::validate_config).
    pub fn new(steps: Vec<DecayStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[DecayStep] {
        &self.steps
    }

    /// Inclusive index range for the given placement count.
    ///
    /// Past the final `decay_at` the final step keeps applying. An empty
    /// schedule yields `(0, 0)`.
    pub fn select_range(&self, rooms_placed: u32) -> (usize, usize) {
        self.steps
            .iter()
            .find(|step| rooms_placed < step.decay_at)
            .or_else(|| self.steps.last())
            .map_or((0, 0), |step| (step.lower_index, step.upper_index))
    }

    /// Draw a catalog index uniformly from the active range.
    pub fn sample(&self, rng: &mut impl Rng, rooms_placed: u32) -> usize {
        let (lower, upper) = self.select_range(rooms_placed);
        if lower >= upper {
            return lower;
        }
        rng.gen_range(lower..=upper)
    }
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self::new(default_steps())
    }
}

/// Reference schedule for the default five-room catalog: open with junctions
/// and crossroads, then drift toward caps and corners.
pub fn default_steps() -> Vec<DecayStep> {
    vec![
        DecayStep::new(2, 4, 12),
        DecayStep::new(1, 3, 30),
        DecayStep::new(0, 2, 60),
        DecayStep::new(0, 1, 90),
        DecayStep::new(0, 0, 1000),
    ]
}
