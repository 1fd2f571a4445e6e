//! Configuration structures for training
//!
//! This module provides the training configuration: network shape, gradient
//! descent hyperparameters, L2 strength and how malformed inputs are treated.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::EngineError;
use crate::validation::InputPolicy;

/// Configuration for training a classifier
///
/// Parsed from JSON. Only `layer_dims` is required.
///
/// # Example
///
/// ```json
/// {
///   "layer_dims": [400, 25, 10],
///   "learning_rate": 0.3,
///   "lambda": 0.7,
///   "num_iterations": 3000,
///   "print_cost_every": 100,
///   "seed": 1,
///   "input_policy": "strict"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Units per layer, input layer first.
    pub layer_dims: Vec<usize>,

    /// Gradient descent step size
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// L2 regularization strength
    #[serde(default)]
    pub lambda: f64,

    #[serde(default = "default_num_iterations")]
    pub num_iterations: usize,

    /// Record (and log) the cost every this many iterations; 0 disables it
    #[serde(default = "default_print_cost_every")]
    pub print_cost_every: usize,

    /// Seed for weight initialization
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// "lenient" (default) or "strict"
    #[serde(default)]
    pub input_policy: InputPolicy,
}

fn default_learning_rate() -> f64 {
    0.0075
}

fn default_num_iterations() -> usize {
    3000
}

fn default_print_cost_every() -> usize {
    100
}

fn default_seed() -> u64 {
    1
}

impl TrainingConfig {
    /// Config with defaults for everything but the layer sizes.
    pub fn new(layer_dims: Vec<usize>) -> Self {
        Self {
            layer_dims,
            learning_rate: default_learning_rate(),
            lambda: 0.0,
            num_iterations: default_num_iterations(),
            print_cost_every: default_print_cost_every(),
            seed: default_seed(),
            input_policy: InputPolicy::default(),
        }
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path` and deserializes its JSON contents into a `TrainingConfig`.
///
/// # Returns
///
/// `Ok(TrainingConfig)` on success, or an error if the file cannot be read, the JSON
/// is invalid, or a value is out of range.
///
/// # Examples
///
/// ```no_run
/// use deep_classifier::config::load_config;
///
/// let cfg = load_config("config/digits.json").unwrap();
/// assert_eq!(cfg.layer_dims.first(), Some(&400));
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TrainingConfig, EngineError> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &TrainingConfig) -> Result<(), EngineError> {
    if config.layer_dims.len() < 2 {
        return Err(EngineError::InvalidConfig(
            "layer_dims needs at least an input and an output layer".to_string(),
        ));
    }

    if config.layer_dims.contains(&0) {
        return Err(EngineError::InvalidConfig(
            "layer_dims entries must be positive".to_string(),
        ));
    }

    if !(config.learning_rate.is_finite() && config.learning_rate > 0.0) {
        return Err(EngineError::InvalidConfig(
            "learning_rate must be positive".to_string(),
        ));
    }

    if !(config.lambda.is_finite() && config.lambda >= 0.0) {
        return Err(EngineError::InvalidConfig(
            "lambda must be non-negative".to_string(),
        ));
    }

    Ok(())
}
