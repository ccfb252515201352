//! Error types for generation and persistence.

use crate::config::ConfigError;
use thiserror::Error;

/// Why a generation run produced no dungeon.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// The configuration failed validation; nothing was placed.
    #[error("invalid dungeon configuration: {}", summarize(.0))]
    InvalidConfig(Vec<ConfigError>),
    /// A prototype had no door that could face its parent.
    #[error("prototype '{0}' has no open door to attach through")]
    InvalidPrototype(String),
    /// Every attempt ran out of frontier without placing the ending room.
    /// Loosen the chain length, enlarge the grid, or soften the decay.
    #[error("failed to place the ending room after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

fn summarize(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur during layout save/load.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("layout format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}
