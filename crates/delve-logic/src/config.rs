//! Generation settings and their validation.
//!
//! Everything a caller can tune before generating lives in
//! [`DungeonConfig`]. Configurations are plain serde data so they can be
//! authored as JSON and checked with [`validate_config`] before any room is
//! placed.
//!
//! ```
//! use delve_logic::config::{validate_config, DungeonConfig};
//!
//! let mut config = DungeonConfig::default();
//! config.dungeon_size = 21;
//! config.chain_length = 7;
//! assert!(validate_config(&config).is_empty());
//! ```

use crate::catalog::RoomCatalog;
use crate::decay::{default_steps, DecayStep};
use crate::frontier::PlacementOrder;
use crate::room::PrototypeRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest grid that leaves room for a connector and a room on each side.
pub const MIN_DUNGEON_SIZE: u32 = 3;
/// Largest grid the editor slider offers.
pub const MAX_DUNGEON_SIZE: u32 = 99;
/// Full attempts before generation gives up.
pub const DEFAULT_RETRY_LIMIT: u32 = 50;

fn default_retry_limit() -> u32 {
    DEFAULT_RETRY_LIMIT
}

/// Caller-editable generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonConfig {
    /// Cells along one side of the square grid. Must be odd so the start
    /// room has a true center.
    pub dungeon_size: u32,
    /// Room-complexity schedule, ascending by `decay_at`.
    pub decay_steps: Vec<DecayStep>,
    #[serde(default)]
    pub placement_order: PlacementOrder,
    /// Minimum distance from the start before the ending room may appear.
    pub chain_length: u32,
    /// World-space edge length of one grid cell. Rooms may be smaller but
    /// never larger.
    pub room_cell_size: f32,
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    /// Random seed (None = draw from entropy).
    #[serde(default)]
    pub seed: Option<u64>,
    /// Generate as soon as the driver starts instead of waiting for a call.
    #[serde(default)]
    pub generate_on_start: bool,
    pub catalog: RoomCatalog,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            dungeon_size: 15,
            decay_steps: default_steps(),
            placement_order: PlacementOrder::Queue,
            chain_length: 5,
            room_cell_size: 10.0,
            retry_limit: DEFAULT_RETRY_LIMIT,
            seed: None,
            generate_on_start: true,
            catalog: RoomCatalog::default(),
        }
    }
}

impl DungeonConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Set the grid size from a free-form request (a slider or CLI value),
    /// snapped to the nearest odd size the generator accepts.
    pub fn set_dungeon_size(&mut self, requested: i32) -> u32 {
        let min = MIN_DUNGEON_SIZE as i32;
        let max = MAX_DUNGEON_SIZE as i32;
        if let Some(size) = snap_odd(requested, min, max) {
            self.dungeon_size = size as u32;
        }
        self.dungeon_size
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("dungeon size {0} must be odd")]
    EvenDungeonSize(u32),
    #[error("dungeon size {0} outside the supported range 3..=99")]
    DungeonSizeOutOfRange(u32),
    #[error("room catalog is empty")]
    EmptyRoomCatalog,
    #[error("connector catalog is empty")]
    EmptyConnectorCatalog,
    #[error("no decay steps configured")]
    EmptyDecaySteps,
    /// Step whose lower index exceeds its upper index.
    #[error("decay step {step}: lower index {lower} exceeds upper index {upper}")]
    InvalidDecayRange {
        step: usize,
        lower: usize,
        upper: usize,
    },
    /// Step whose `decay_at` does not increase over the previous one.
    #[error("decay step {step}: decay_at {decay_at} is not above the previous step")]
    DecayStepsUnordered { step: usize, decay_at: u32 },
    /// Step referencing a room past the end of the catalog.
    #[error("decay step {step}: index {index} out of range for {catalog_len} rooms")]
    IndexOutOfRange {
        step: usize,
        index: usize,
        catalog_len: usize,
    },
    #[error("prototype '{name}' is invalid: {reason}")]
    InvalidPrototype { name: String, reason: String },
    #[error("room cell size must be positive and finite")]
    InvalidCellSize,
    #[error("retry limit must be at least 1")]
    ZeroRetryLimit,
}

fn invalid_prototype(name: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidPrototype {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &DungeonConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.dungeon_size % 2 == 0 {
        errors.push(ConfigError::EvenDungeonSize(config.dungeon_size));
    }
    if !(MIN_DUNGEON_SIZE..=MAX_DUNGEON_SIZE).contains(&config.dungeon_size) {
        errors.push(ConfigError::DungeonSizeOutOfRange(config.dungeon_size));
    }
    if !(config.room_cell_size.is_finite() && config.room_cell_size > 0.0) {
        errors.push(ConfigError::InvalidCellSize);
    }
    if config.retry_limit == 0 {
        errors.push(ConfigError::ZeroRetryLimit);
    }

    let catalog = &config.catalog;
    if catalog.rooms.is_empty() {
        errors.push(ConfigError::EmptyRoomCatalog);
    }
    if catalog.connectors.is_empty() {
        errors.push(ConfigError::EmptyConnectorCatalog);
    }

    errors.extend(validate_decay_steps(
        &config.decay_steps,
        catalog.rooms.len(),
    ));
    errors.extend(validate_prototypes(catalog));

    errors
}

fn validate_decay_steps(steps: &[DecayStep], catalog_len: usize) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    if steps.is_empty() {
        errors.push(ConfigError::EmptyDecaySteps);
        return errors;
    }

    for (i, step) in steps.iter().enumerate() {
        if step.lower_index > step.upper_index {
            errors.push(ConfigError::InvalidDecayRange {
                step: i,
                lower: step.lower_index,
                upper: step.upper_index,
            });
        }
        // An empty catalog is reported on its own
        if catalog_len > 0 && step.upper_index >= catalog_len {
            errors.push(ConfigError::IndexOutOfRange {
                step: i,
                index: step.upper_index,
                catalog_len,
            });
        }
        if i > 0 && step.decay_at <= steps[i - 1].decay_at {
            errors.push(ConfigError::DecayStepsUnordered {
                step: i,
                decay_at: step.decay_at,
            });
        }
    }
    errors
}

fn validate_prototypes(catalog: &RoomCatalog) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    for (proto, room) in catalog.entries() {
        // Rotation could never line a sealed room up with its parent
        if room.doors.is_sealed() {
            errors.push(invalid_prototype(&room.name, "has no open door"));
        }
        let should_connect = matches!(proto, PrototypeRef::Connector(_));
        if room.is_connector != should_connect {
            let reason = if should_connect {
                "connector catalog entry is not flagged as a connector"
            } else {
                "only connector catalog entries may be connectors"
            };
            errors.push(invalid_prototype(&room.name, reason));
        }
        if matches!(proto, PrototypeRef::DeadEnd | PrototypeRef::Ending)
            && room.doors.open_count() > 1
        {
            errors.push(invalid_prototype(
                &room.name,
                "terminal rooms must have exactly one door",
            ));
        }
    }
    errors
}

/// Clamp `value` into `min..=max` and snap it to an odd number.
///
/// Even values snap down to the odd number below, or up when below would
/// leave the range. Returns `None` when the range contains no odd number.
pub fn snap_odd(value: i32, min: i32, max: i32) -> Option<i32> {
    let (mut min, mut max) = if max < min { (max, min) } else { (min, max) };
    if min % 2 == 0 {
        min += 1;
    }
    if max % 2 == 0 {
        max -= 1;
    }
    if min > max {
        return None;
    }

    let value = value.clamp(min, max);
    if value % 2 != 0 {
        return Some(value);
    }
    let lower = value - 1;
    if lower < min {
        Some(value + 1)
    } else {
        Some(lower)
    }
}
