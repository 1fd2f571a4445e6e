//! Dense (fully connected) layer implementation
//!
//! A layer holds a weight matrix W (units_out × units_in) and a bias column
//! b (units_out × 1). Activations are laid out one example per column, so the
//! forward transformation is `z = W·a_prev + b` and the output has shape
//! (units_out × m).
//!
//! The forward step returns a cache of everything the backward step needs:
//!
//! ```text
//! forward:   z = W·a_prev + b              cache (a_prev, W, b), z
//! backward:  dW      = (1/m)·dZ·a_prev^T + (λ/m)·W
//!            db      = (1/m)·Σ_examples dZ
//!            dA_prev = W^T·dZ
//! ```
//!
//! W and b are borrowed in the cache, so the parameters cannot change while a
//! propagation cycle that depends on them is still alive.

use ndarray::{Array2, ArrayView2, Axis};

use crate::error::{ensure_shape, EngineError};
use crate::utils::Activation;

/// Weights and bias of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    pub weight: Array2<f64>,
    pub bias: Array2<f64>,
}

impl DenseLayer {
    /// Builds a layer from existing matrices, checking that `bias` is a
    /// (units_out × 1) column matching `weight`.
    pub fn new(weight: Array2<f64>, bias: Array2<f64>) -> Result<Self, EngineError> {
        ensure_shape("DenseLayer bias", (weight.nrows(), 1), bias.dim())?;
        Ok(Self { weight, bias })
    }

    /// Layer with all-zero parameters.
    pub fn zeros(input_size: usize, output_size: usize) -> Self {
        Self {
            weight: Array2::zeros((output_size, input_size)),
            bias: Array2::zeros((output_size, 1)),
        }
    }

    /// Number of input features.
    pub fn input_size(&self) -> usize {
        self.weight.ncols()
    }

    /// Number of units.
    pub fn output_size(&self) -> usize {
        self.weight.nrows()
    }
}

/// Inputs of the linear step, kept for the backward pass.
#[derive(Debug, Clone)]
pub struct LinearCache<'a> {
    pub a_prev: Array2<f64>,
    pub weight: ArrayView2<'a, f64>,
    pub bias: ArrayView2<'a, f64>,
}

/// Everything one layer's forward step leaves behind for its backward step.
#[derive(Debug, Clone)]
pub struct LayerCache<'a> {
    pub linear: LinearCache<'a>,
    /// Pre-activation value.
    pub z: Array2<f64>,
    pub activation: Activation,
}

/// Gradients produced by one layer's backward step.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    /// Gradient with respect to the previous layer's activation.
    pub da_prev: Array2<f64>,
    pub dw: Array2<f64>,
    pub db: Array2<f64>,
}

/// Linear step: `z = W·a + b`.
///
/// Takes ownership of `a` because the returned cache keeps it.
pub fn linear_forward<'a>(
    a: Array2<f64>,
    weight: ArrayView2<'a, f64>,
    bias: ArrayView2<'a, f64>,
) -> Result<(Array2<f64>, LinearCache<'a>), EngineError> {
    ensure_shape(
        "linear_forward input",
        (weight.ncols(), a.ncols()),
        a.dim(),
    )?;
    ensure_shape("linear_forward bias", (weight.nrows(), 1), bias.dim())?;

    let z = weight.dot(&a) + &bias;
    ensure_shape("linear_forward output", (weight.nrows(), a.ncols()), z.dim())?;

    let cache = LinearCache {
        a_prev: a,
        weight,
        bias,
    };
    Ok((z, cache))
}

/// Linear step followed by `activation`.
pub fn linear_activation_forward<'a>(
    a_prev: Array2<f64>,
    weight: ArrayView2<'a, f64>,
    bias: ArrayView2<'a, f64>,
    activation: Activation,
) -> Result<(Array2<f64>, LayerCache<'a>), EngineError> {
    let (z, linear) = linear_forward(a_prev, weight, bias)?;
    let a = activation.forward(&z);
    ensure_shape(
        "linear_activation_forward output",
        (linear.weight.nrows(), linear.a_prev.ncols()),
        a.dim(),
    )?;
    Ok((
        a,
        LayerCache {
            linear,
            z,
            activation,
        },
    ))
}

/// Backward linear step with an L2 penalty of strength `lambda`.
pub fn linear_backward_with_l2(
    dz: &Array2<f64>,
    cache: &LinearCache<'_>,
    lambda: f64,
) -> Result<LayerGradients, EngineError> {
    let LinearCache {
        a_prev,
        weight,
        bias,
    } = cache;
    ensure_shape(
        "linear_backward dZ",
        (weight.nrows(), a_prev.ncols()),
        dz.dim(),
    )?;

    let m = a_prev.ncols() as f64;
    let dw = dz.dot(&a_prev.t()) / m + &(weight * (lambda / m));
    let db = dz.sum_axis(Axis(1)).insert_axis(Axis(1)) / m;
    let da_prev = weight.t().dot(dz);

    ensure_shape("linear_backward dA_prev", a_prev.dim(), da_prev.dim())?;
    ensure_shape("linear_backward dW", weight.dim(), dw.dim())?;
    ensure_shape("linear_backward db", bias.dim(), db.dim())?;

    Ok(LayerGradients { da_prev, dw, db })
}

/// Activation derivative followed by the backward linear step.
pub fn linear_activation_backward_with_l2(
    da: &Array2<f64>,
    cache: &LayerCache<'_>,
    lambda: f64,
) -> Result<LayerGradients, EngineError> {
    let dz = cache.activation.backward(da, &cache.z)?;
    linear_backward_with_l2(&dz, &cache.linear, lambda)
}
