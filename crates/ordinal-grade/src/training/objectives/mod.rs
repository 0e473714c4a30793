//! Objective (loss) functions for ordinal training.
//!
//! Objectives score a batch of per-threshold probabilities against integer
//! grade labels and produce gradients for an external optimizer. This crate
//! does not train; it supplies the supervision signal and its derivatives.
//!
//! # Layout
//!
//! Predictions are **row-major** `(n_samples, n_outputs)`: one row per sample,
//! one column per threshold. Gradient buffers share that shape.
//!
//! # Available Objectives
//!
//! - [`OrdinalLoss`]: CORAL loss, mean binary cross-entropy over thresholds

mod ordinal;

pub use ordinal::{ordinal_loss, OrdinalLoss};

use ndarray::{ArrayView2, ArrayViewMut2};

use crate::error::Result;
use crate::inference::Grade;
use crate::training::GradsTuple;

// =============================================================================
// Objective Trait
// =============================================================================

/// A loss over per-threshold probabilities and integer grade labels.
///
/// Implementations validate shapes, label range and numeric domain, and
/// fail rather than clamp.
pub trait ObjectiveFn: Send + Sync {
    /// Number of outputs (predictions per sample).
    fn n_outputs(&self) -> usize;

    /// Mean loss over the batch.
    fn loss(&self, predictions: ArrayView2<f32>, labels: &[Grade]) -> Result<f64>;

    /// Gradient and hessian of [`loss`](Self::loss) w.r.t. each output's logit.
    ///
    /// `grad_hess` must have the same shape as `predictions`.
    fn compute_gradients_into(
        &self,
        predictions: ArrayView2<f32>,
        labels: &[Grade],
        grad_hess: ArrayViewMut2<GradsTuple>,
    ) -> Result<()>;

    /// Name of the objective (for logging).
    fn name(&self) -> &'static str;
}
