//! Optimizer abstractions for parameter updates
//!
//! Optimizers take the [`Gradients`] produced by a backward pass and move the
//! [`ParameterSet`] against them. The propagation engine itself never mutates
//! parameters; this is the only place that does.
//!
//! # Example
//!
//! ```ignore
//! use deep_classifier::optimizers::{Optimizer, SGD};
//!
//! let mut optimizer = SGD::new(0.0075);
//! let grads = l_model_backward_with_l2(&pass.output, &y, pass.caches, lambda)?;
//! optimizer.update(&mut params, &grads)?;
//! ```

pub mod sgd;

pub use sgd::SGD;

use crate::error::EngineError;
use crate::parameters::ParameterSet;
use crate::propagation::Gradients;

/// Core trait for parameter optimizers.
pub trait Optimizer {
    /// Applies one update step to every layer of `params`.
    ///
    /// Fails if `grads` does not have a gradient of matching shape for each
    /// weight and bias.
    fn update(&mut self, params: &mut ParameterSet, grads: &Gradients) -> Result<(), EngineError>;
}
