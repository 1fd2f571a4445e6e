//! Gradient descent optimizer implementation
//!
//! This module provides a vanilla gradient descent optimizer that performs the
//! basic update on every layer: `W_l -= η·dW_l`, `b_l -= η·db_l`.

use crate::error::{ensure_shape, EngineError};
use crate::optimizers::Optimizer;
use crate::parameters::ParameterSet;
use crate::propagation::Gradients;

/// Gradient descent optimizer.
///
/// Implements the basic gradient descent update rule without momentum or
/// adaptive learning rates:
///
/// `w = w - η * ∇J/∂w`
///
/// where η (eta) is the learning rate. The L2 term is already part of `dW`, so
/// no extra weight decay is applied here.
pub struct SGD {
    learning_rate: f64,
}

impl SGD {
    /// Creates a new optimizer with the specified learning rate.
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for SGD {
    fn update(&mut self, params: &mut ParameterSet, grads: &Gradients) -> Result<(), EngineError> {
        if grads.num_layers() != params.num_layers() {
            return Err(EngineError::shape(
                "SGD layer count",
                (params.num_layers(), 1),
                (grads.num_layers(), 1),
            ));
        }

        for (layer, grad) in params.layers_mut().iter_mut().zip(grads.layers()) {
            ensure_shape("SGD dW", layer.weight.dim(), grad.dw.dim())?;
            ensure_shape("SGD db", layer.bias.dim(), grad.db.dim())?;
            layer.weight.scaled_add(-self.learning_rate, &grad.dw);
            layer.bias.scaled_add(-self.learning_rate, &grad.db);
        }
        Ok(())
    }
}
