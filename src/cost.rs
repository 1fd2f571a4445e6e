//! Cross-entropy cost, plain and L2-regularized
//!
//! ```text
//! J      = (1/m) · Σ( -y·log(a)^T - (1-y)·log(1-a)^T )
//! J_L2   = J + (λ / 2m) · Σ_l Σ W_l²
//! ```
//!
//! `·` is the matrix product and m is the number of examples (columns of y).
//! With a single output row this is the usual binary cross-entropy averaged over
//! examples. With several rows the product also pairs each label row with every
//! prediction row; that is the defined cost, not an accident of layout.

use ndarray::{Array2, ArrayD};
use tracing::warn;

use crate::error::EngineError;
use crate::parameters::{lookup, weight_key, NamedParameters, ParameterSet};
use crate::validation::{promote, Checked, Promotion};

/// Prediction substituted when the cost inputs are malformed.
pub const FALLBACK_PREDICTION: f64 = 0.5;
/// Label substituted when the cost inputs are malformed.
pub const FALLBACK_LABEL: f64 = 0.6;

/// Cross-entropy between predictions `al` and labels `y`.
///
/// Both must have the same, non-zero number of columns.
pub fn compute_cost(al: &Array2<f64>, y: &Array2<f64>) -> Result<f64, EngineError> {
    if al.ncols() != y.ncols() {
        return Err(EngineError::ExampleCountMismatch {
            context: "compute_cost",
            predictions: al.ncols(),
            labels: y.ncols(),
        });
    }
    if y.ncols() == 0 {
        return Err(EngineError::InvalidInput(
            "compute_cost needs at least one example".to_string(),
        ));
    }
    let m = y.ncols() as f64;

    let log_a = al.mapv(f64::ln);
    let log_one_minus_a = al.mapv(|a| (1.0 - a).ln());
    let one_minus_y = y.mapv(|v| 1.0 - v);

    let total = -y.dot(&log_a.t()) - one_minus_y.dot(&log_one_minus_a.t());
    Ok(total.sum() / m)
}

/// Cross-entropy plus the L2 penalty over every layer of `params`.
pub fn compute_cost_with_l2(
    al: &Array2<f64>,
    y: &Array2<f64>,
    params: &ParameterSet,
    lambda: f64,
) -> Result<f64, EngineError> {
    let cross_entropy = compute_cost(al, y)?;
    Ok(cross_entropy + l2_penalty(params.weight_square_sum(), lambda, y.ncols()))
}

/// Lenient cross-entropy over dynamically shaped inputs.
///
/// Scalars are read as 1x1 matrices. Anything else that is not 2-D replaces both
/// inputs with `(a = 0.5, y = 0.6)` and the result is a [`Checked::Fallback`].
pub fn compute_cost_checked(al: &ArrayD<f64>, y: &ArrayD<f64>) -> Result<Checked<f64>, EngineError> {
    match cost_inputs(al, y) {
        Checked::Valid((al, y)) => compute_cost(&al, &y).map(Checked::Valid),
        Checked::Fallback((al, y)) => compute_cost(&al, &y).map(Checked::Fallback),
    }
}

/// Lenient regularized cost over a string-keyed parameter mapping.
///
/// The layer count is half the number of entries; a missing `W{l}` for any layer
/// in range fails with [`EngineError::MissingParameter`], whether or not the cost
/// inputs fell back to defaults.
pub fn compute_cost_with_l2_named(
    al: &ArrayD<f64>,
    y: &ArrayD<f64>,
    named: &NamedParameters,
    lambda: f64,
) -> Result<Checked<f64>, EngineError> {
    let inputs = cost_inputs(al, y);
    let m = inputs.value().1.ncols();

    let num_layers = named.len() / 2;
    let mut w_square_sum = 0.0;
    for l in 1..=num_layers {
        let weight = lookup(named, &weight_key(l)).map_err(|e| {
            warn!(layer = l, "invalid parameter set");
            e
        })?;
        w_square_sum += weight.iter().map(|w| w * w).sum::<f64>();
    }

    let penalty = l2_penalty(w_square_sum, lambda, m);
    match inputs {
        Checked::Valid((al, y)) => Ok(Checked::Valid(compute_cost(&al, &y)? + penalty)),
        Checked::Fallback((al, y)) => Ok(Checked::Fallback(compute_cost(&al, &y)? + penalty)),
    }
}

fn l2_penalty(w_square_sum: f64, lambda: f64, m: usize) -> f64 {
    lambda / (2.0 * m as f64) * w_square_sum
}

fn cost_inputs(al: &ArrayD<f64>, y: &ArrayD<f64>) -> Checked<(Array2<f64>, Array2<f64>)> {
    match (promote(al, false), promote(y, false)) {
        (
            Promotion::Matrix(al) | Promotion::Promoted(al),
            Promotion::Matrix(y) | Promotion::Promoted(y),
        ) => Checked::Valid((al, y)),
        _ => {
            warn!(
                al_ndim = al.ndim(),
                y_ndim = y.ndim(),
                "cost inputs are not 2-D arrays, using default values"
            );
            Checked::Fallback((
                Array2::from_elem((1, 1), FALLBACK_PREDICTION),
                Array2::from_elem((1, 1), FALLBACK_LABEL),
            ))
        }
    }
}
