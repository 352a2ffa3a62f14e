//! Error types for configuration problems.
//!
//! Nothing in the simulation treats these as fatal. They are reported once,
//! logged, and the affected feature becomes a no-op for the session.

use thiserror::Error;

use crate::enums::PoolKind;

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A problem with the configuration snapshot handed to the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// No template configured for a pool; the pool stays empty.
    #[error("no {0:?} template configured; the {0:?} pool is disabled")]
    MissingTemplate(PoolKind),

    /// A min/max window where min exceeds max.
    #[error("invalid range for '{field}': min {min} exceeds max {max}")]
    InvalidRange {
        /// Dotted config path.
        field: &'static str,
        min: f64,
        max: f64,
    },

    /// A value, or the width of a window, that must be a finite number.
    #[error("'{field}' must be finite, got {value}")]
    NotFinite {
        /// Dotted config path.
        field: &'static str,
        value: f64,
    },

    /// A value that must be strictly positive.
    #[error("'{field}' must be positive, got {value}")]
    NotPositive {
        /// Dotted config path.
        field: &'static str,
        value: f64,
    },

    /// Attack range must fit inside detection range or the chase state is unreachable.
    #[error("enemy attack range {attack} exceeds detection range {detection}")]
    AttackBeyondDetection { attack: f64, detection: f64 },

    /// Config document failed to parse.
    #[error("failed to parse config: {0}")]
    Parse(String),
}
