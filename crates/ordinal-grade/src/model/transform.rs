//! Squashing applied to raw backbone output before decoding.
//!
//! The [`ScoreTransform`] enum defines how a backbone's raw outputs are turned
//! into the scores the decoder expects. It is stored with the model metadata
//! so that the grading service doesn't need to know how the backbone was
//! trained.
//!
//! # Variants
//!
//! - [`Identity`](ScoreTransform::Identity): Backbone already emits probabilities
//! - [`Sigmoid`](ScoreTransform::Sigmoid): Independent per-threshold logits (ordinal heads)
//! - [`Softmax`](ScoreTransform::Softmax): One logit per grade (categorical heads)

use serde::{Deserialize, Serialize};

/// Inference-time score transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTransform {
    /// No transformation; scores are used as-is.
    #[default]
    Identity,

    /// Logistic sigmoid: score = 1 / (1 + exp(-logit)), element-wise.
    Sigmoid,

    /// Softmax over the whole vector.
    Softmax,
}

impl ScoreTransform {
    /// Apply the transformation in-place to a single score vector.
    ///
    /// # Numerical Stability
    ///
    /// - Sigmoid clamps input to [-500, 500] to avoid overflow.
    /// - Softmax subtracts the max before exponentiating.
    ///
    /// NaN and Inf inputs propagate through without panics.
    #[inline]
    pub fn apply_inplace(&self, scores: &mut [f32]) {
        match self {
            ScoreTransform::Identity => {}
            ScoreTransform::Sigmoid => {
                for x in scores.iter_mut() {
                    *x = sigmoid(*x);
                }
            }
            ScoreTransform::Softmax => softmax_inplace(scores),
        }
    }
}

/// Numerically stable sigmoid.
#[inline]
fn sigmoid(x: f32) -> f32 {
    let clamped = x.clamp(-500.0, 500.0);
    if clamped >= 0.0 {
        1.0 / (1.0 + (-clamped).exp())
    } else {
        let e = clamped.exp();
        e / (1.0 + e)
    }
}

#[inline]
fn softmax_inplace(row: &mut [f32]) {
    if row.is_empty() {
        return;
    }

    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

    let mut sum = 0.0f32;
    for x in row.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }

    if sum > 0.0 {
        for x in row.iter_mut() {
            *x /= sum;
        }
    }
}
