//! Error types for the propagation engine.
//!
//! Every fallible operation in the crate returns `Result<T, EngineError>`.
//! Invalid-input fallbacks are not errors; they are reported through
//! [`crate::validation::Checked`] and only become an [`EngineError::InvalidInput`]
//! when the caller asks for strict handling.

use thiserror::Error;

/// Shape as (rows, cols), used in error reports.
pub type Shape = (usize, usize);

#[derive(Error, Debug)]
pub enum EngineError {
    /// An expected `W{l}` / `b{l}` entry is absent from a named parameter mapping.
    #[error("Missing layer parameter: {key}")]
    MissingParameter { key: String },

    /// Two arrays that must agree in shape do not.
    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Shape,
        actual: Shape,
    },

    /// Predictions and labels disagree on the number of examples (columns).
    #[error("Example count mismatch in {context}: {predictions} prediction columns, {labels} label columns")]
    ExampleCountMismatch {
        context: &'static str,
        predictions: usize,
        labels: usize,
    },

    /// Forward propagation needs at least one layer.
    #[error("Parameter set is empty")]
    EmptyParameters,

    /// Input was malformed and the caller asked for strict validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Training configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn shape(context: &'static str, expected: Shape, actual: Shape) -> Self {
        EngineError::ShapeMismatch {
            context,
            expected,
            actual,
        }
    }
}

/// Returns a shape mismatch error unless `actual == expected`.
pub(crate) fn ensure_shape(
    context: &'static str,
    expected: Shape,
    actual: Shape,
) -> Result<(), EngineError> {
    if expected == actual {
        Ok(())
    } else {
        Err(EngineError::shape(context, expected, actual))
    }
}
