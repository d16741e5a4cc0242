//! Error taxonomy for the analysis engine

use std::path::PathBuf;
use std::time::Duration;

/// Errors surfaced to the request layer
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Property not found: {0}")]
    NotFound(i32),

    #[error("Benchmark requires at least one comparable rent")]
    EmptyComparables,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Why the regression model could not produce a prediction.
/// Never propagated past the analyzer; it becomes a null or degraded value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelUnavailable {
    #[error("model artifact not found at {}", .0.display())]
    Missing(PathBuf),

    #[error("model artifact unreadable: {0}")]
    Unreadable(String),

    #[error("model artifact corrupt: {0}")]
    Corrupt(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("inference timed out after {0:?}")]
    Timeout(Duration),
}
