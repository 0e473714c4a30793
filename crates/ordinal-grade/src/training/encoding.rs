//! Ordinal label encoding.
//!
//! A grade `g` out of `K` classes becomes `K - 1` binary indicators where
//! position `i` is 1 iff `i < g`. The vector is always `g` ones followed by
//! zeros, e.g. grade 2 of 5 is `[1, 1, 0, 0]`.

use ndarray::{s, Array2};

use crate::error::{GradeError, Result};
use crate::inference::Grade;
use crate::model::ConfigError;

/// Encode one grade as `num_classes - 1` threshold indicators.
///
/// # Errors
///
/// - [`GradeError::Range`] if `grade >= num_classes`; never clamps
/// - [`GradeError::Config`] if `num_classes < 2`
///
/// # Example
///
/// ```
/// use ordinal_grade::training::encode_ordinal_label;
///
/// assert_eq!(encode_ordinal_label(2, 5).unwrap(), vec![1.0, 1.0, 0.0, 0.0]);
/// assert!(encode_ordinal_label(5, 5).is_err());
/// ```
pub fn encode_ordinal_label(grade: Grade, num_classes: usize) -> Result<Vec<f32>> {
    let mut encoded = vec![0.0f32; n_thresholds(num_classes)?];
    encode_into(grade, num_classes, &mut encoded)?;
    Ok(encoded)
}

/// Encode a batch of grades into a `(labels.len(), num_classes - 1)` matrix.
pub fn encode_ordinal_batch(labels: &[Grade], num_classes: usize) -> Result<Array2<f32>> {
    let mut encoded = Array2::<f32>::zeros((labels.len(), n_thresholds(num_classes)?));
    for (mut row, &grade) in encoded.rows_mut().into_iter().zip(labels) {
        check_grade(grade, num_classes)?;
        row.slice_mut(s![..grade]).fill(1.0);
    }
    Ok(encoded)
}

/// Write the encoding of `grade` into `out`, which holds `num_classes - 1` zeros.
#[inline]
fn encode_into(grade: Grade, num_classes: usize, out: &mut [f32]) -> Result<()> {
    check_grade(grade, num_classes)?;
    out[..grade].fill(1.0);
    Ok(())
}

#[inline]
pub(crate) fn check_grade(grade: Grade, num_classes: usize) -> Result<()> {
    if grade >= num_classes {
        return Err(GradeError::Range { grade, num_classes });
    }
    Ok(())
}

fn n_thresholds(num_classes: usize) -> Result<usize> {
    if num_classes < 2 {
        return Err(ConfigError::TooFewClasses(num_classes).into());
    }
    Ok(num_classes - 1)
}
