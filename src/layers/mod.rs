//! Layer abstractions for the propagation engine
//!
//! Fully connected layers, their forward caches and per-layer gradients.

pub mod dense;

pub use dense::{
    linear_activation_backward_with_l2, linear_activation_forward, linear_backward_with_l2,
    linear_forward, DenseLayer, LayerCache, LayerGradients, LinearCache,
};
