//! CORAL ordinal loss.
//!
//! Each of the `K - 1` outputs is an independent Bernoulli probability
//! `p_i ≈ P(grade > i)`. The loss for one sample is the mean binary
//! cross-entropy between `p` and the encoded label; the batch loss is the mean
//! over samples.
//!
//! ```text
//! L = 1/B Σ_b 1/(K-1) Σ_i -[y_bi ln p_bi + (1 - y_bi) ln(1 - p_bi)]
//! ```
//!
//! With `p = σ(z)`, the derivatives w.r.t. the logit `z_bi` are
//! `(p - y) / ((K-1)·B)` and `p(1 - p) / ((K-1)·B)`.

use ndarray::{ArrayView2, ArrayViewMut2};

use super::ObjectiveFn;
use crate::error::{check_thresholds, GradeError, Result};
use crate::inference::Grade;
use crate::training::encoding::check_grade;
use crate::training::GradsTuple;

/// Hessian floor, keeps Newton steps finite for saturated outputs.
const HESS_MIN: f32 = 1e-6;

/// CORAL loss for `num_classes` ordered grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdinalLoss {
    num_classes: usize,
}

impl OrdinalLoss {
    pub fn new(num_classes: usize) -> Self {
        Self { num_classes }
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Check shapes, labels and the (0, 1) domain of every prediction.
    fn validate(&self, predictions: ArrayView2<f32>, labels: &[Grade]) -> Result<()> {
        let (n_rows, n_cols) = predictions.dim();
        check_thresholds(self.num_classes, n_cols)?;
        if labels.len() != n_rows {
            return Err(GradeError::DimensionMismatch {
                what: "labels per prediction row",
                expected: n_rows,
                got: labels.len(),
            });
        }
        for &grade in labels {
            check_grade(grade, self.num_classes)?;
        }
        for row in predictions.rows() {
            for (index, &value) in row.iter().enumerate() {
                // NaN fails both comparisons
                if !(value > 0.0 && value < 1.0) {
                    return Err(GradeError::OutOfDomain { index, value });
                }
            }
        }
        Ok(())
    }
}

impl ObjectiveFn for OrdinalLoss {
    fn n_outputs(&self) -> usize {
        self.num_classes.saturating_sub(1)
    }

    /// Mean BCE over thresholds, then over samples. An empty batch has loss 0.
    fn loss(&self, predictions: ArrayView2<f32>, labels: &[Grade]) -> Result<f64> {
        self.validate(predictions, labels)?;
        let n_rows = labels.len();
        if n_rows == 0 {
            return Ok(0.0);
        }

        let n_thresholds = self.n_outputs() as f64;
        let total: f64 = predictions
            .rows()
            .into_iter()
            .zip(labels)
            .map(|(row, &grade)| {
                let sample: f64 = row
                    .iter()
                    .enumerate()
                    .map(|(i, &p)| {
                        let p = f64::from(p);
                        if i < grade { -p.ln() } else { -(1.0 - p).ln() }
                    })
                    .sum();
                sample / n_thresholds
            })
            .sum();

        Ok(total / n_rows as f64)
    }

    fn compute_gradients_into(
        &self,
        predictions: ArrayView2<f32>,
        labels: &[Grade],
        mut grad_hess: ArrayViewMut2<GradsTuple>,
    ) -> Result<()> {
        self.validate(predictions, labels)?;
        if grad_hess.dim() != predictions.dim() {
            return Err(GradeError::DimensionMismatch {
                what: "gradient buffer elements",
                expected: predictions.len(),
                got: grad_hess.len(),
            });
        }

        let n_rows = labels.len();
        if n_rows == 0 {
            return Ok(());
        }
        let scale = 1.0 / (self.n_outputs() * n_rows) as f32;

        for ((row, mut out), &grade) in predictions
            .rows()
            .into_iter()
            .zip(grad_hess.rows_mut())
            .zip(labels)
        {
            for (i, (&p, pair)) in row.iter().zip(out.iter_mut()).enumerate() {
                let target = if i < grade { 1.0 } else { 0.0 };
                *pair = GradsTuple::new(scale * (p - target), (scale * p * (1.0 - p)).max(HESS_MIN));
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ordinal_coral"
    }
}

/// CORAL loss of a `(batch, num_classes - 1)` probability matrix.
///
/// # Errors
///
/// - [`GradeError::Shape`] if the column count isn't `num_classes - 1`
/// - [`GradeError::DimensionMismatch`] if `labels.len()` isn't the row count
/// - [`GradeError::Range`] for a label outside `[0, num_classes - 1]`
/// - [`GradeError::OutOfDomain`] for a prediction outside `(0, 1)`
pub fn ordinal_loss(predictions: ArrayView2<f32>, labels: &[Grade], num_classes: usize) -> Result<f64> {
    OrdinalLoss::new(num_classes).loss(predictions, labels)
}

// =============================================================================
// Tests
// =============================================================================
