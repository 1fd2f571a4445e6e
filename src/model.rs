//! Training loop for an L-layer classifier
//!
//! Ties the engine together: He initialization, then for every iteration a
//! forward pass, the regularized cost, a backward pass and a gradient descent
//! step.

use ndarray::{Array2, ArrayD};
use tracing::{debug, info};

use crate::config::{validate_config, TrainingConfig};
use crate::cost::compute_cost_with_l2;
use crate::error::{ensure_shape, EngineError};
use crate::labels::change_to_multi_class;
use crate::optimizers::{Optimizer, SGD};
use crate::parameters::ParameterSet;
use crate::prediction::one_vs_all_prediction;
use crate::propagation::{l_model_backward_with_l2, l_model_forward, ForwardPass};
use crate::utils::SimpleRng;

/// Result of [`l_layer_model`].
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub parameters: ParameterSet,
    /// `(iteration, cost)` recorded every `print_cost_every` iterations.
    pub costs: Vec<(usize, f64)>,
}

/// Trains a network of shape `config.layer_dims` on `x` (features × m) and
/// targets `y` (output units × m).
pub fn l_layer_model(
    x: &Array2<f64>,
    y: &Array2<f64>,
    config: &TrainingConfig,
) -> Result<TrainedModel, EngineError> {
    validate_config(config)?;
    let output_units = config.layer_dims[config.layer_dims.len() - 1];
    ensure_shape("l_layer_model input", (config.layer_dims[0], x.ncols()), x.dim())?;
    ensure_shape("l_layer_model labels", (output_units, x.ncols()), y.dim())?;

    let mut rng = SimpleRng::new(config.seed);
    let mut params = ParameterSet::initialize_he(&config.layer_dims, &mut rng)?;
    let mut optimizer = SGD::new(config.learning_rate);
    let mut costs = Vec::new();

    for iteration in 0..config.num_iterations {
        let ForwardPass { output, caches } = l_model_forward(x, &params)?;
        let cost = compute_cost_with_l2(&output, y, &params, config.lambda)?;
        let grads = l_model_backward_with_l2(&output, y, caches, config.lambda)?;
        optimizer.update(&mut params, &grads)?;

        if config.print_cost_every > 0 && iteration % config.print_cost_every == 0 {
            info!(iteration, cost, "training cost");
            costs.push((iteration, cost));
        } else {
            debug!(iteration, cost, "training cost");
        }
    }

    Ok(TrainedModel {
        parameters: params,
        costs,
    })
}

/// Trains from a 1×m row of class indices instead of a target matrix.
///
/// The labels are one-hot encoded first; `config.input_policy` decides whether a
/// malformed label array is rejected or replaced by the default encoding.
pub fn train_classifier(
    x: &Array2<f64>,
    labels: &ArrayD<f64>,
    config: &TrainingConfig,
) -> Result<TrainedModel, EngineError> {
    let y = change_to_multi_class(labels).with_policy(config.input_policy, "labels")?;
    l_layer_model(x, &y, config)
}

/// Predicted class of every example in `x`, as a 1×m row.
pub fn predict(params: &ParameterSet, x: &Array2<f64>) -> Result<Array2<usize>, EngineError> {
    let pass = l_model_forward(x, params)?;
    one_vs_all_prediction(&pass.output)
}
