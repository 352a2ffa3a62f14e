//! Host-side errors. The simulation itself never fails; these cover loading
//! configuration and managing the loop thread.

use std::path::PathBuf;

use thiserror::Error;

use gauntlet_core::error::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn game loop thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("game loop thread panicked")]
    LoopPanicked,

    #[error("game loop is not running")]
    LoopStopped,

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
