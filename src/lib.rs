//! Deep classifier
//!
//! A fully connected feed-forward classifier built from first principles:
//! forward propagation with cached activations, L2-regularized cross-entropy and
//! reverse-mode gradients.
//!
//! # Modules
//!
//! - `propagation`: L-layer forward and backward passes
//! - `layers`: Dense layer parameters, linear steps and caches
//! - `cost`: Plain and L2-regularized cross-entropy
//! - `labels`: One-hot label encoding
//! - `prediction`: One-vs-all decision and accuracy
//! - `parameters`: Parameter sets, initialization and `W{l}`/`b{l}` serialization
//! - `optimizers`: Gradient descent update
//! - `model`: Training loop
//! - `config`: Training configuration
//! - `validation`: Tagged valid/fallback results for lenient inputs
//! - `utils`: Activations and RNG
//!
//! # Example
//!
//! ```
//! use deep_classifier::parameters::ParameterSet;
//! use deep_classifier::propagation::{l_model_backward_with_l2, l_model_forward};
//! use deep_classifier::utils::SimpleRng;
//! use ndarray::arr2;
//!
//! let params = ParameterSet::initialize_he(&[2, 3, 1], &mut SimpleRng::new(3)).unwrap();
//! let x = arr2(&[[0.0, 1.0], [1.0, 0.0]]);
//! let y = arr2(&[[1.0, 0.0]]);
//!
//! let pass = l_model_forward(&x, &params).unwrap();
//! let grads = l_model_backward_with_l2(&pass.output, &y, pass.caches, 0.1).unwrap();
//! assert_eq!(grads.num_layers(), 2);
//! ```

pub mod config;
pub mod cost;
pub mod error;
pub mod labels;
pub mod layers;
pub mod model;
pub mod optimizers;
pub mod parameters;
pub mod prediction;
pub mod propagation;
pub mod utils;
pub mod validation;

pub use error::EngineError;
pub use parameters::ParameterSet;
pub use propagation::{l_model_backward_with_l2, l_model_forward, ForwardPass, Gradients};
pub use validation::{Checked, InputPolicy};
