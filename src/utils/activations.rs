//! Activation functions and their derivatives
//!
//! This module provides the element-wise nonlinearities used by the propagation
//! engine:
//! - Leaky ReLU (hidden layers)
//! - Sigmoid (output layer)
//! - ReLU (alternate hidden activation)
//!
//! Scalar versions operate on a single `f64`; [`Activation`] applies them to a
//! whole pre-activation matrix and computes `dZ` from `dA` in the backward pass.

use ndarray::{Array2, ArrayD, Zip};
use tracing::warn;

use crate::error::{ensure_shape, EngineError};
use crate::validation::{promote, Checked, Promotion};

/// Slope of leaky ReLU for non-positive inputs.
pub const LEAKY_RELU_SLOPE: f64 = 0.01;

/// Sigmoid activation function.
///
/// Returns the sigmoid of the input: 1 / (1 + exp(-x))
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Leaky ReLU: max(0.01x, x).
pub fn leaky_relu(x: f64) -> f64 {
    if x > 0.0 {
        x
    } else {
        LEAKY_RELU_SLOPE * x
    }
}

/// ReLU: max(0, x).
pub fn relu(x: f64) -> f64 {
    if x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Element-wise nonlinearity applied after a linear step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Sigmoid,
    LeakyRelu,
    Relu,
}

impl Activation {
    /// Applies the activation to every element of `z`.
    pub fn forward(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Sigmoid => z.mapv(sigmoid),
            Activation::LeakyRelu => z.mapv(leaky_relu),
            Activation::Relu => z.mapv(relu),
        }
    }

    /// Computes dZ from the incoming gradient `da` and the cached pre-activation `z`.
    pub fn backward(self, da: &Array2<f64>, z: &Array2<f64>) -> Result<Array2<f64>, EngineError> {
        match self {
            Activation::Sigmoid => sigmoid_backward(da, z),
            Activation::LeakyRelu => leaky_relu_backward(da, z),
            Activation::Relu => relu_backward(da, z),
        }
    }
}

/// dZ = dA · s · (1 - s), with s = sigmoid(z).
pub fn sigmoid_backward(da: &Array2<f64>, z: &Array2<f64>) -> Result<Array2<f64>, EngineError> {
    ensure_shape("sigmoid_backward", z.dim(), da.dim())?;
    Ok(Zip::from(da).and(z).map_collect(|&d, &z| {
        let s = sigmoid(z);
        d * s * (1.0 - s)
    }))
}

/// dZ = dA scaled by 1 where z > 0 and by 0.01 where z <= 0.
pub fn leaky_relu_backward(da: &Array2<f64>, z: &Array2<f64>) -> Result<Array2<f64>, EngineError> {
    ensure_shape("leaky_relu_backward", z.dim(), da.dim())?;
    Ok(Zip::from(da)
        .and(z)
        .map_collect(|&d, &z| if z > 0.0 { d } else { d * LEAKY_RELU_SLOPE }))
}

/// dZ = dA with entries zeroed wherever z <= 0.
pub fn relu_backward(da: &Array2<f64>, z: &Array2<f64>) -> Result<Array2<f64>, EngineError> {
    ensure_shape("relu_backward", z.dim(), da.dim())?;
    Ok(Zip::from(da)
        .and(z)
        .map_collect(|&d, &z| if z > 0.0 { d } else { 0.0 }))
}

/// Sigmoid derivative accepting scalars and vectors.
///
/// Scalars are coerced to 1x1 and vectors to a single row before computing; the
/// result is then tagged [`Checked::Fallback`]. Arrays of three or more
/// dimensions cannot be coerced and yield a shape error.
pub fn sigmoid_backward_lenient(
    da: &ArrayD<f64>,
    z: &ArrayD<f64>,
) -> Result<Checked<Array2<f64>>, EngineError> {
    let (da, da_coerced) = coerce("dA", da)?;
    let (z, z_coerced) = coerce("Z", z)?;
    let dz = sigmoid_backward(&da, &z)?;
    if da_coerced || z_coerced {
        Ok(Checked::Fallback(dz))
    } else {
        Ok(Checked::Valid(dz))
    }
}

fn coerce(name: &'static str, input: &ArrayD<f64>) -> Result<(Array2<f64>, bool), EngineError> {
    match promote(input, true) {
        Promotion::Matrix(m) => Ok((m, false)),
        Promotion::Promoted(m) => {
            warn!(input = name, ndim = input.ndim(), "coercing input to a matrix");
            Ok((m, true))
        }
        Promotion::Rejected => Err(EngineError::InvalidInput(format!(
            "{} has {} dimensions and cannot be read as a matrix",
            name,
            input.ndim()
        ))),
    }
}
