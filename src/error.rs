//! Error types shared by every stage of a training run.

use thiserror::Error;

/// Errors that can abort a training step, an evaluation pass or a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("No gradient available for parameter `{param}`; it is not connected to the loss")]
    GradientUnavailable { param: String },

    #[error("Layer `{layer}` has not been built")]
    NotBuilt { layer: String },

    #[error("Layer `{layer}` is already built")]
    AlreadyBuilt { layer: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
