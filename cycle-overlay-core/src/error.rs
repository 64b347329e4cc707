//! Error types for the cycle-overlay generator.

use thiserror::Error;

/// Errors that can occur during a generation run.
#[derive(Error, Debug)]
pub enum CycleOverlayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source record not found at {0}. The file is the source of truth for this user; create it with at least a last_period_start date")]
    SourceMissing(String),

    #[error("Roster error: {0}")]
    Roster(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for cycle-overlay operations.
pub type CycleOverlayResult<T> = Result<T, CycleOverlayError>;
