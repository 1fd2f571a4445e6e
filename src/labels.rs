//! One-hot label encoding
//!
//! Turns a 1×m row of class indices into a (num_classes × m) indicator matrix,
//! the shape the cost and backward pass expect for `y`.

use ndarray::{Array2, ArrayD};
use tracing::warn;

use crate::validation::{as_matrix, Checked};

/// Encodes a row vector of class labels as a one-hot matrix.
///
/// `num_classes` is one more than the largest label. Elements that are not
/// non-negative integers are assigned to class 0. Inputs that are not
/// two-dimensional (or have no rows), and labels too large to size a one-hot
/// matrix for, are replaced by `[[0]]` and the result is tagged
/// [`Checked::Fallback`].
///
/// # Examples
///
/// ```
/// use deep_classifier::labels::change_to_multi_class;
/// use ndarray::arr2;
///
/// let y = arr2(&[[2.0, 0.0, 1.0]]).into_dyn();
/// let one_hot = change_to_multi_class(&y).into_inner();
/// assert_eq!(one_hot, arr2(&[[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]));
/// ```
pub fn change_to_multi_class(y: &ArrayD<f64>) -> Checked<Array2<f64>> {
    let labels = match as_matrix(y).filter(|m| m.nrows() > 0) {
        Some(labels) => labels,
        None => {
            warn!(
                ndim = y.ndim(),
                shape = ?y.shape(),
                "label input is not a 2-D array, using default [[0]]"
            );
            return Checked::Fallback(default_encoding());
        }
    };

    match encode_row(&labels) {
        Some(one_hot) => Checked::Valid(one_hot),
        None => {
            warn!(
                examples = labels.ncols(),
                "largest label is too large to one-hot encode, using default [[0]]"
            );
            Checked::Fallback(default_encoding())
        }
    }
}

fn default_encoding() -> Array2<f64> {
    Array2::from_elem((1, 1), 1.0)
}

/// Class index for one label, or `None` when it is not a non-negative integer.
fn class_index(label: f64) -> Option<usize> {
    if label.is_finite() && label >= 0.0 && label.fract() == 0.0 {
        Some(label as usize)
    } else {
        None
    }
}

/// One-hot encodes row 0, or `None` when the class count or the matrix size
/// does not fit in memory addressing.
fn encode_row(labels: &Array2<f64>) -> Option<Array2<f64>> {
    let row = labels.row(0);
    let largest = row
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    // `as` saturates, so an out-of-range label shows up as the overflow below.
    let num_classes = (largest.trunc() as usize).checked_add(1)?;
    let bytes = num_classes
        .checked_mul(row.len())?
        .checked_mul(std::mem::size_of::<f64>())?;
    if bytes > isize::MAX as usize {
        return None;
    }

    let mut one_hot = Array2::zeros((num_classes, row.len()));
    for (i, &label) in row.iter().enumerate() {
        let class = class_index(label)
            .filter(|&c| c < num_classes)
            .unwrap_or(0);
        one_hot[[class, i]] = 1.0;
    }
    Some(one_hot)
}
