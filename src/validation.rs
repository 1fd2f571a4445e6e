//! Input validation with explicit fallbacks.
//!
//! The lenient entry points (label encoding, cost, the lenient sigmoid derivative)
//! accept dynamically-shaped arrays. When an input is malformed they substitute a
//! fixed default, emit a warning, and tag the result as [`Checked::Fallback`].
//! Callers that would rather fail use [`Checked::strict`] or an [`InputPolicy`].

use ndarray::{Array2, ArrayD, Ix2};
use serde::Deserialize;

use crate::error::EngineError;

/// Result of a validating computation: either computed from the caller's input
/// or from a substituted default.
#[derive(Debug, Clone, PartialEq)]
pub enum Checked<T> {
    Valid(T),
    Fallback(T),
}

impl<T> Checked<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Checked::Fallback(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Checked::Valid(v) | Checked::Fallback(v) => v,
        }
    }

    /// Returns the value regardless of how it was obtained.
    pub fn into_inner(self) -> T {
        match self {
            Checked::Valid(v) | Checked::Fallback(v) => v,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Checked<U> {
        match self {
            Checked::Valid(v) => Checked::Valid(f(v)),
            Checked::Fallback(v) => Checked::Fallback(f(v)),
        }
    }

    /// Rejects fallback values.
    ///
    /// `what` names the input in the resulting error message.
    pub fn strict(self, what: &str) -> Result<T, EngineError> {
        match self {
            Checked::Valid(v) => Ok(v),
            Checked::Fallback(_) => Err(EngineError::InvalidInput(format!(
                "{} is malformed",
                what
            ))),
        }
    }

    /// Applies `policy`: lenient keeps fallbacks, strict rejects them.
    pub fn with_policy(self, policy: InputPolicy, what: &str) -> Result<T, EngineError> {
        match policy {
            InputPolicy::Lenient => Ok(self.into_inner()),
            InputPolicy::Strict => self.strict(what),
        }
    }
}

/// How the caller wants malformed inputs treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    /// Substitute defaults and keep going.
    #[default]
    Lenient,
    /// Turn any substitution into an error.
    Strict,
}

/// Outcome of coercing a dynamic array into a matrix.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Promotion {
    /// Input already was 2-D.
    Matrix(Array2<f64>),
    /// Input was reshaped into a matrix (scalar to 1x1, vector to 1xn).
    Promoted(Array2<f64>),
    /// Input cannot be read as a matrix.
    Rejected,
}

/// Views `input` as a matrix only if it is exactly two-dimensional.
pub fn as_matrix(input: &ArrayD<f64>) -> Option<Array2<f64>> {
    input
        .view()
        .into_dimensionality::<Ix2>()
        .ok()
        .map(|m| m.to_owned())
}

/// Coerces `input` into a matrix.
///
/// Scalars always become 1x1. One-dimensional arrays become a single row only when
/// `allow_vector` is set.
pub(crate) fn promote(input: &ArrayD<f64>, allow_vector: bool) -> Promotion {
    match input.ndim() {
        2 => match as_matrix(input) {
            Some(m) => Promotion::Matrix(m),
            None => Promotion::Rejected,
        },
        0 => match input.iter().next() {
            Some(&x) => Promotion::Promoted(Array2::from_elem((1, 1), x)),
            None => Promotion::Rejected,
        },
        1 if allow_vector => {
            let data: Vec<f64> = input.iter().copied().collect();
            match Array2::from_shape_vec((1, data.len()), data) {
                Ok(m) => Promotion::Promoted(m),
                Err(_) => Promotion::Rejected,
            }
        }
        _ => Promotion::Rejected,
    }
}
