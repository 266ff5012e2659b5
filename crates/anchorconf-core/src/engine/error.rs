use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::traits::RecordError;
use crate::core::models::outcome::OutcomeChannel;

/// Errors that abort a whole run. Per-molecule failures are outcomes, not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Scaffold {index} ('{name}') has atoms without coordinates")]
    ScaffoldWithoutGeometry { index: usize, name: String },

    #[error("Failed to read molecules: {source}")]
    Source {
        #[from]
        source: RecordError,
    },

    #[error("Failed to write to the {channel} channel: {source}")]
    Sink {
        channel: OutcomeChannel,
        source: RecordError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
