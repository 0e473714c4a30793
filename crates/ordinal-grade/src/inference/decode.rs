//! Decoding raw per-threshold scores into grades and distributions.
//!
//! A CORAL head emits `K - 1` scores where `s[i]` estimates `P(grade > i)`.
//! Two independent rules turn those scores into a prediction:
//!
//! - **Grade**: round every score to the nearer of {0, 1} (ties round up)
//!   and count the ones. The count is always in `[0, K - 1]`, whatever the
//!   ordering of `s`.
//! - **Distribution**: telescoping differences
//!
//! ```text
//! P(0)   = 1 - s[0]
//! P(k)   = s[k-1] - s[k]      0 < k < K-1
//! P(K-1) = s[K-2]
//! ```
//!
//! The distribution always sums to 1. Its entries are non-negative only when
//! `s` is non-increasing; a trained model gives no such guarantee, so negative
//! entries are reported as-is unless [`DistributionCorrection::ClampAndRenormalize`]
//! is configured.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use super::Grade;
use crate::error::{check_thresholds, GradeError, Result};
use crate::model::ConfigError;
use crate::utils::Parallelism;

// =============================================================================
// Free functions
// =============================================================================

/// Count the thresholds whose score rounds to 1.
///
/// # Example
///
/// ```
/// use ordinal_grade::inference::decode_grade;
///
/// assert_eq!(decode_grade(&[0.9, 0.8, 0.3, 0.1]), 2);
/// // Order doesn't matter
/// assert_eq!(decode_grade(&[0.1, 0.9, 0.2, 0.8]), 2);
/// ```
#[inline]
pub fn decode_grade(raw: &[f32]) -> Grade {
    raw.iter().filter(|&&s| s >= 0.5).count()
}

/// Telescoped per-grade probabilities for `num_classes` grades.
///
/// Fails with a shape error if `raw.len() != num_classes - 1`. No clamping is
/// applied; see [`DistributionCorrection`].
pub fn decode_distribution(raw: &[f32], num_classes: usize) -> Result<Vec<f32>> {
    check_thresholds(num_classes, raw.len())?;
    let mut distribution = vec![0.0f32; num_classes];
    telescope_into(raw, &mut distribution);
    Ok(distribution)
}

/// Decode with the raw (unclamped) distribution.
pub fn decode(raw: &[f32], num_classes: usize) -> Result<PredictionResult> {
    OrdinalDecoder::new(num_classes).decode(raw)
}

/// `out[0] = 1 - s[0]`, `out[k] = s[k-1] - s[k]`, `out[K-1] = s[K-2]`.
///
/// Caller guarantees `out.len() == raw.len() + 1` and `raw` non-empty.
#[inline]
fn telescope_into(raw: &[f32], out: &mut [f32]) {
    debug_assert_eq!(out.len(), raw.len() + 1);
    let last = raw.len();
    out[0] = 1.0 - raw[0];
    for k in 1..last {
        out[k] = raw[k - 1] - raw[k];
    }
    out[last] = raw[last - 1];
}

/// Returns true if `raw` is non-increasing (the well-formed ordinal case).
#[inline]
pub fn is_rank_consistent(raw: &[f32]) -> bool {
    raw.windows(2).all(|w| w[0] >= w[1])
}

// =============================================================================
// DistributionCorrection
// =============================================================================

/// What to do with negative entries of a telescoped distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionCorrection {
    /// Report the telescoped values unchanged. Negative entries expose
    /// rank inconsistency in the raw scores.
    #[default]
    NoClamp,
    /// Clamp negatives to zero and rescale to sum to 1.
    ClampAndRenormalize,
}

impl DistributionCorrection {
    /// Apply the correction in-place.
    pub fn apply_inplace(&self, distribution: &mut [f32]) {
        match self {
            Self::NoClamp => {}
            Self::ClampAndRenormalize => {
                let mut sum = 0.0f32;
                for p in distribution.iter_mut() {
                    *p = p.max(0.0);
                    sum += *p;
                }
                if sum > 0.0 {
                    for p in distribution.iter_mut() {
                        *p /= sum;
                    }
                } else if !distribution.is_empty() {
                    let uniform = 1.0 / distribution.len() as f32;
                    distribution.fill(uniform);
                }
            }
        }
    }
}

// =============================================================================
// PredictionResult
// =============================================================================

/// Decoded output of one classifier for one input.
///
/// Immutable once produced; the distribution may contain negative entries
/// when decoded with [`DistributionCorrection::NoClamp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    grade: Grade,
    confidence: f32,
    distribution: Vec<f32>,
    raw_scores: Vec<f32>,
}

impl PredictionResult {
    pub fn new(grade: Grade, confidence: f32, distribution: Vec<f32>, raw_scores: Vec<f32>) -> Self {
        Self {
            grade,
            confidence,
            distribution,
            raw_scores,
        }
    }

    /// Predicted grade.
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Distribution value at the predicted grade, in `[0, 1]` for
    /// well-formed scores.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Confidence as a percentage rounded to two decimals.
    pub fn confidence_percent(&self) -> f64 {
        (f64::from(self.confidence) * 10_000.0).round() / 100.0
    }

    /// Per-grade probabilities.
    pub fn distribution(&self) -> &[f32] {
        &self.distribution
    }

    /// Scores as produced by the model (after its squashing transform).
    pub fn raw_scores(&self) -> &[f32] {
        &self.raw_scores
    }

    /// Number of grades.
    pub fn num_classes(&self) -> usize {
        self.distribution.len()
    }
}

// =============================================================================
// OrdinalDecoder
// =============================================================================

/// Decoder for a fixed number of grades and correction policy.
///
/// Stateless and `Copy`; share freely across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdinalDecoder {
    num_classes: usize,
    correction: DistributionCorrection,
}

impl OrdinalDecoder {
    /// Decoder that reports raw telescoped distributions.
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            correction: DistributionCorrection::NoClamp,
        }
    }

    pub fn with_correction(mut self, correction: DistributionCorrection) -> Self {
        self.correction = correction;
        self
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn correction(&self) -> DistributionCorrection {
        self.correction
    }

    /// Decode `num_classes - 1` cumulative scores.
    pub fn decode(&self, raw: &[f32]) -> Result<PredictionResult> {
        check_thresholds(self.num_classes, raw.len())?;

        if !is_rank_consistent(raw) {
            tracing::warn!(scores = ?raw, "non-monotone threshold scores");
        }
        if raw.iter().any(|s| !(0.0..=1.0).contains(s)) {
            tracing::warn!(scores = ?raw, "threshold scores outside [0, 1]");
        }

        let grade = decode_grade(raw);
        let mut distribution = vec![0.0f32; self.num_classes];
        telescope_into(raw, &mut distribution);
        self.correction.apply_inplace(&mut distribution);
        let confidence = distribution[grade];

        tracing::debug!(grade, confidence, "decoded ordinal scores");
        Ok(PredictionResult::new(grade, confidence, distribution, raw.to_vec()))
    }

    /// Decode `num_classes` per-grade probabilities from a categorical head.
    ///
    /// The grade is the arg-max (first on ties). No correction is applied;
    /// categorical heads are already normalized by their softmax.
    pub fn decode_categorical(&self, probs: &[f32]) -> Result<PredictionResult> {
        if self.num_classes < 2 {
            return Err(ConfigError::TooFewClasses(self.num_classes).into());
        }
        if probs.len() != self.num_classes {
            return Err(GradeError::shape(self.num_classes, probs.len()));
        }

        // NaN never wins, so an all-NaN head falls back to grade 0
        let grade = (1..probs.len()).fold(0, |best, i| {
            let beats = probs[i] > probs[best] || (probs[best].is_nan() && !probs[i].is_nan());
            if beats { i } else { best }
        });
        let confidence = probs[grade];

        tracing::debug!(grade, confidence, "decoded categorical scores");
        Ok(PredictionResult::new(grade, confidence, probs.to_vec(), probs.to_vec()))
    }

    /// Decode every row of a `(n_samples, num_classes - 1)` score matrix.
    ///
    /// Rows are independent and decoded in parallel when allowed. Fails on
    /// the first shape error; with a correct column count no row can fail.
    pub fn decode_batch(
        &self,
        scores: ArrayView2<f32>,
        parallelism: Parallelism,
    ) -> Result<Vec<PredictionResult>> {
        let (n_rows, n_cols) = scores.dim();
        check_thresholds(self.num_classes, n_cols)?;

        parallelism
            .maybe_par_map(0..n_rows, |i| {
                let raw: Vec<f32> = scores.row(i).iter().copied().collect();
                self.decode(&raw)
            })
            .into_iter()
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::DEFAULT_TOLERANCE;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn grade_counts_exceeded_thresholds() {
        assert_eq!(decode_grade(&[0.9, 0.8, 0.3, 0.1]), 2);
        assert_eq!(decode_grade(&[0.0, 0.0, 0.0, 0.0]), 0);
        assert_eq!(decode_grade(&[1.0, 1.0, 1.0, 1.0]), 4);
    }

    #[test]
    fn grade_ties_round_up() {
        assert_eq!(decode_grade(&[0.5, 0.49, 0.0, 0.0]), 1);
    }

    #[test]
    fn grade_ignores_nan() {
        assert_eq!(decode_grade(&[f32::NAN, 0.9, 0.1, 0.0]), 1);
    }

    #[test]
    fn distribution_well_formed() {
        let dist = decode_distribution(&[0.9, 0.8, 0.3, 0.1], 5).unwrap();
        let expected = [0.1, 0.1, 0.5, 0.2, 0.1];
        for (p, e) in dist.iter().zip(expected) {
            assert_abs_diff_eq!(*p, e, epsilon = DEFAULT_TOLERANCE);
        }
        assert!(dist.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn distribution_increasing_scores_go_negative() {
        let dist = decode_distribution(&[0.1, 0.3, 0.6, 0.9], 5).unwrap();
        assert!(dist.iter().any(|&p| p < 0.0));
        let sum: f32 = dist.iter().sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = DEFAULT_TOLERANCE);
    }

    #[test]
    fn distribution_shape_error() {
        let err = decode_distribution(&[0.5, 0.5], 5).unwrap_err();
        assert!(matches!(err, GradeError::Shape { expected: 4, got: 2 }));
    }

    #[test]
    fn two_class_distribution() {
        let dist = decode_distribution(&[0.7], 2).unwrap();
        assert_abs_diff_eq!(dist[0], 0.3, epsilon = DEFAULT_TOLERANCE);
        assert_abs_diff_eq!(dist[1], 0.7, epsilon = DEFAULT_TOLERANCE);
    }

    #[test]
    fn decode_confidence_is_distribution_at_grade() {
        let result = decode(&[0.9, 0.8, 0.3, 0.1], 5).unwrap();
        assert_eq!(result.grade(), 2);
        assert_abs_diff_eq!(result.confidence(), 0.5, epsilon = DEFAULT_TOLERANCE);
        assert_eq!(result.raw_scores(), &[0.9, 0.8, 0.3, 0.1]);
        assert_eq!(result.num_classes(), 5);
        assert_abs_diff_eq!(result.confidence_percent(), 50.0, epsilon = 1e-3);
    }

    #[test]
    fn decode_can_report_negative_confidence() {
        // Rounds to [0, 1, 1, 1] -> grade 3, P(3) = 0.6 - 0.9 < 0
        let result = decode(&[0.1, 0.6, 0.6, 0.9], 5).unwrap();
        assert_eq!(result.grade(), 3);
        assert!(result.confidence() < 0.0);
    }

    #[test]
    fn clamp_and_renormalize() {
        let decoder = OrdinalDecoder::new(5).with_correction(DistributionCorrection::ClampAndRenormalize);
        let result = decoder.decode(&[0.1, 0.6, 0.6, 0.9]).unwrap();
        assert!(result.distribution().iter().all(|&p| p >= 0.0));
        let sum: f32 = result.distribution().iter().sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = DEFAULT_TOLERANCE);
        assert_eq!(result.confidence(), 0.0);
    }

    #[test]
    fn clamp_leaves_valid_distribution_unchanged() {
        let mut dist = vec![0.1, 0.1, 0.5, 0.2, 0.1];
        DistributionCorrection::ClampAndRenormalize.apply_inplace(&mut dist);
        let expected = [0.1, 0.1, 0.5, 0.2, 0.1];
        for (p, e) in dist.iter().zip(expected) {
            assert_abs_diff_eq!(*p, e, epsilon = DEFAULT_TOLERANCE);
        }
    }

    #[test]
    fn categorical_argmax() {
        let decoder = OrdinalDecoder::new(5);
        let result = decoder.decode_categorical(&[0.05, 0.1, 0.6, 0.2, 0.05]).unwrap();
        assert_eq!(result.grade(), 2);
        assert_abs_diff_eq!(result.confidence(), 0.6, epsilon = DEFAULT_TOLERANCE);

        assert!(matches!(
            decoder.decode_categorical(&[0.5, 0.5]),
            Err(GradeError::Shape { expected: 5, got: 2 })
        ));
    }

    #[test]
    fn categorical_confidence_is_distribution_entry() {
        let decoder = OrdinalDecoder::new(5);

        let result = decoder.decode_categorical(&[f32::NAN; 5]).unwrap();
        assert_eq!(result.grade(), 0);
        assert!(result.confidence().is_nan());

        let result = decoder
            .decode_categorical(&[f32::NAN, 0.1, 0.7, f32::NAN, 0.2])
            .unwrap();
        assert_eq!(result.grade(), 2);
        assert_eq!(result.confidence(), result.distribution()[result.grade()]);

        let tied = decoder.decode_categorical(&[0.1, 0.4, 0.1, 0.4, 0.0]).unwrap();
        assert_eq!(tied.grade(), 1);
    }

    #[test]
    fn batch_matches_single() {
        let scores = array![[0.9, 0.8, 0.3, 0.1], [0.2, 0.1, 0.0, 0.0], [0.99, 0.95, 0.9, 0.7]];
        let decoder = OrdinalDecoder::new(5);

        for parallelism in [Parallelism::Sequential, Parallelism::Parallel] {
            let results = decoder.decode_batch(scores.view(), parallelism).unwrap();
            let grades: Vec<_> = results.iter().map(PredictionResult::grade).collect();
            assert_eq!(grades, vec![2, 0, 4]);
        }
    }

    #[test]
    fn batch_shape_error() {
        let scores = array![[0.9, 0.8, 0.3]];
        let err = OrdinalDecoder::new(5)
            .decode_batch(scores.view(), Parallelism::Sequential)
            .unwrap_err();
        assert!(matches!(err, GradeError::Shape { expected: 4, got: 3 }));
    }

    #[test]
    fn rank_consistency() {
        assert!(is_rank_consistent(&[0.9, 0.8, 0.8, 0.1]));
        assert!(!is_rank_consistent(&[0.1, 0.8]));
        assert!(is_rank_consistent(&[0.4]));
    }
}
