//! Forward and backward propagation over all layers
//!
//! ```text
//! forward:  X ─[linear → leaky_relu]×(L-1)─[linear → sigmoid]─> A_L     caches 1..L
//! backward: dA_L ─[sigmoid' → linear']─[leaky_relu' → linear']×(L-1)─> grads
//! ```
//!
//! The forward pass returns its caches by value; the backward pass consumes them,
//! so a cache sequence is used by exactly one backward pass.

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::error::{ensure_shape, EngineError};
use crate::layers::{
    linear_activation_backward_with_l2, linear_activation_forward, LayerCache, LayerGradients,
};
use crate::parameters::{bias_key, weight_key, ParameterSet};
use crate::utils::Activation;

/// Output of [`l_model_forward`]: final activation plus per-layer caches in
/// forward order.
#[derive(Debug)]
pub struct ForwardPass<'a> {
    pub output: Array2<f64>,
    pub caches: Vec<LayerCache<'a>>,
}

/// Runs the input `x` (features × m) through every layer of `params`.
///
/// Hidden layers use leaky ReLU, the last layer uses sigmoid.
pub fn l_model_forward<'a>(
    x: &Array2<f64>,
    params: &'a ParameterSet,
) -> Result<ForwardPass<'a>, EngineError> {
    let num_layers = params.num_layers();
    if num_layers == 0 {
        return Err(EngineError::EmptyParameters);
    }

    let mut caches = Vec::with_capacity(num_layers);
    let mut a = x.clone();
    for (i, layer) in params.layers().iter().enumerate() {
        let activation = if i + 1 == num_layers {
            Activation::Sigmoid
        } else {
            Activation::LeakyRelu
        };
        let (next, cache) =
            linear_activation_forward(a, layer.weight.view(), layer.bias.view(), activation)?;
        debug!(layer = i + 1, shape = ?next.dim(), ?activation, "forward");
        caches.push(cache);
        a = next;
    }

    Ok(ForwardPass { output: a, caches })
}

/// Gradients for every layer, indexed like the parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    layers: Vec<LayerGradients>,
}

impl Gradients {
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Gradients of layer `l`, counted from 1.
    pub fn layer(&self, l: usize) -> Option<&LayerGradients> {
        l.checked_sub(1).and_then(|i| self.layers.get(i))
    }

    pub fn layers(&self) -> &[LayerGradients] {
        &self.layers
    }

    /// dW for layer `l`.
    pub fn dw(&self, l: usize) -> Option<&Array2<f64>> {
        self.layer(l).map(|g| &g.dw)
    }

    /// db for layer `l`.
    pub fn db(&self, l: usize) -> Option<&Array2<f64>> {
        self.layer(l).map(|g| &g.db)
    }

    /// dA{l}: gradient of the activation that feeds layer `l + 1` (`dA0` is the
    /// gradient with respect to the input).
    pub fn da(&self, l: usize) -> Option<&Array2<f64>> {
        self.layers.get(l).map(|g| &g.da_prev)
    }

    /// Exports `dA{l-1}, dW{l}, db{l}` for every layer, from the last layer down.
    pub fn to_named(&self) -> Vec<(String, Array2<f64>)> {
        self.layers
            .iter()
            .enumerate()
            .rev()
            .flat_map(|(i, g)| {
                [
                    (format!("dA{}", i), g.da_prev.clone()),
                    (format!("d{}", weight_key(i + 1)), g.dw.clone()),
                    (format!("d{}", bias_key(i + 1)), g.db.clone()),
                ]
            })
            .collect()
    }
}

/// Backward pass with an L2 penalty of strength `lambda`.
///
/// `al` is the forward output and `y` the labels; `y` is reshaped (row-major) to
/// `al`'s shape, which fails if their element counts differ. Consumes the caches.
pub fn l_model_backward_with_l2(
    al: &Array2<f64>,
    y: &Array2<f64>,
    caches: Vec<LayerCache<'_>>,
    lambda: f64,
) -> Result<Gradients, EngineError> {
    if y.len() != al.len() {
        return Err(EngineError::shape("l_model_backward labels", al.dim(), y.dim()));
    }
    let y = Array2::from_shape_vec(al.dim(), y.iter().copied().collect())
        .map_err(|_| EngineError::shape("l_model_backward labels", al.dim(), y.dim()))?;

    let da_l = Zip::from(&y)
        .and(al)
        .map_collect(|&y, &a| -(y / a - (1.0 - y) / (1.0 - a)));

    let mut layers = Vec::with_capacity(caches.len());
    let mut da = da_l;
    for (i, cache) in caches.iter().enumerate().rev() {
        ensure_shape("l_model_backward dA", cache.z.dim(), da.dim())?;
        let grads = linear_activation_backward_with_l2(&da, cache, lambda)?;
        debug!(layer = i + 1, dw = ?grads.dw.dim(), "backward");
        da = grads.da_prev.clone();
        layers.push(grads);
    }
    layers.reverse();

    Ok(Gradients { layers })
}
