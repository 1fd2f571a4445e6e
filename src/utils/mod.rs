//! Shared utilities for the propagation engine
//!
//! This module provides common utilities like random number generation
//! and activation functions.

pub mod activations;
pub mod rng;

pub use activations::{leaky_relu, relu, sigmoid, Activation};
pub use rng::SimpleRng;
