use std::process;

use deep_classifier::config::{load_config, TrainingConfig};
use deep_classifier::model::{l_layer_model, predict};
use deep_classifier::prediction::accuracy;
use deep_classifier::EngineError;
use ndarray::{arr2, Array2};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Small network to learn XOR (educational example).
const NUM_INPUTS: usize = 2;
const NUM_HIDDEN: usize = 4;
const NUM_OUTPUTS: usize = 1;

// Default hyperparameters when no config file is given.
fn default_config() -> TrainingConfig {
    let mut config = TrainingConfig::new(vec![NUM_INPUTS, NUM_HIDDEN, NUM_OUTPUTS]);
    config.learning_rate = 0.5;
    config.num_iterations = 5000;
    config.print_cost_every = 500;
    config.seed = 42;
    config
}

// XOR dataset, one example per column.
fn xor_dataset() -> (Array2<f64>, Array2<f64>) {
    let x = arr2(&[[0.0, 0.0, 1.0, 1.0], [0.0, 1.0, 0.0, 1.0]]);
    let y = arr2(&[[0.0, 1.0, 1.0, 0.0]]);
    (x, y)
}

fn run(config_path: Option<String>) -> Result<(), EngineError> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => default_config(),
    };
    let (x, y) = xor_dataset();

    let model = l_layer_model(&x, &y, &config)?;
    if let Some((iteration, cost)) = model.costs.last() {
        info!(iteration, cost, "last recorded cost");
    }

    // One output unit: threshold at 0.5 instead of one-vs-all.
    let pass = deep_classifier::l_model_forward(&x, &model.parameters)?;
    let predicted = pass.output.mapv(|p| if p > 0.5 { 1usize } else { 0 });
    for (i, column) in x.columns().into_iter().enumerate() {
        println!(
            "Input: {:.1}, {:.1}, Expected Output: {:.1}, Predicted Output: {:.3}",
            column[0],
            column[1],
            y[[0, i]],
            pass.output[[0, i]]
        );
    }
    println!("Accuracy: {:.2}", accuracy(&predicted, &y)?);

    // Multi-unit networks go through the argmax decision instead.
    if config.layer_dims.last().copied().unwrap_or(0) > 1 {
        println!("Classes: {:?}", predict(&model.parameters, &x)?);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(std::env::args().nth(1)) {
        error!(error = %e, "training failed");
        process::exit(1);
    }
}
