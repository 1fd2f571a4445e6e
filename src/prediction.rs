//! One-vs-all decision
//!
//! Picks, for each example, the class whose output unit is most confident.

use ndarray::{Array2, Axis};

use crate::error::{ensure_shape, EngineError};

/// Row index of the largest probability in every column, as a 1×m matrix.
///
/// Ties go to the lowest index; a NaN counts as the maximum.
///
/// # Examples
///
/// ```
/// use deep_classifier::prediction::one_vs_all_prediction;
/// use ndarray::arr2;
///
/// let probs = arr2(&[[0.1, 0.9], [0.8, 0.05], [0.1, 0.05]]);
/// assert_eq!(one_vs_all_prediction(&probs).unwrap(), arr2(&[[1, 0]]));
/// ```
pub fn one_vs_all_prediction(prob_matrix: &Array2<f64>) -> Result<Array2<usize>, EngineError> {
    if prob_matrix.nrows() == 0 {
        return Err(EngineError::InvalidInput(
            "probability matrix has no classes".to_string(),
        ));
    }

    let m = prob_matrix.ncols();
    let winners: Vec<usize> = prob_matrix
        .axis_iter(Axis(1))
        .map(|column| {
            let mut best = 0;
            for (row, &p) in column.iter().enumerate().skip(1) {
                let current = column[best];
                if !current.is_nan() && (p > current || p.is_nan()) {
                    best = row;
                }
            }
            best
        })
        .collect();

    let prediction = Array2::from_shape_vec((1, m), winners)
        .map_err(|e| EngineError::InvalidInput(e.to_string()))?;
    ensure_shape("one_vs_all_prediction", (1, m), prediction.dim())?;
    Ok(prediction)
}

/// Fraction of examples whose predicted class equals the label.
///
/// `labels` is a 1×m row of class indices.
pub fn accuracy(predictions: &Array2<usize>, labels: &Array2<f64>) -> Result<f64, EngineError> {
    ensure_shape("accuracy", predictions.dim(), labels.dim())?;
    if labels.is_empty() {
        return Ok(0.0);
    }
    let correct = predictions
        .iter()
        .zip(labels.iter())
        .filter(|&(&p, &l)| l >= 0.0 && l.fract() == 0.0 && p == l as usize)
        .count();
    Ok(correct as f64 / labels.len() as f64)
}
