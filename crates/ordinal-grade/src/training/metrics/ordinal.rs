//! Metrics over ordered grades.

use super::{ConfusionMatrix, MetricFn};

// =============================================================================
// Accuracy
// =============================================================================

/// Fraction of samples whose predicted grade equals the true grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accuracy;

impl MetricFn for Accuracy {
    fn compute(&self, confusion: &ConfusionMatrix) -> f64 {
        let n = confusion.n_samples();
        if n == 0 {
            return 0.0;
        }
        confusion.correct() as f64 / n as f64
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "accuracy"
    }
}

// =============================================================================
// Quadratic Weighted Kappa
// =============================================================================

/// Cohen's kappa with weights `(i - j)² / (K - 1)²`.
///
/// 1 is perfect agreement, 0 is chance level. When every label and every
/// prediction is the same grade there is no disagreement to weigh and the
/// value is 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadraticWeightedKappa;

impl MetricFn for QuadraticWeightedKappa {
    fn compute(&self, confusion: &ConfusionMatrix) -> f64 {
        let n = confusion.n_samples() as f64;
        if n == 0.0 {
            return 0.0;
        }

        let k = confusion.num_classes();
        let actual = confusion.actual_totals();
        let predicted = confusion.predicted_totals();
        let norm = ((k - 1) * (k - 1)) as f64;

        let mut observed = 0.0f64;
        let mut expected = 0.0f64;
        for i in 0..k {
            for j in 0..k {
                let weight = (i.abs_diff(j) * i.abs_diff(j)) as f64 / norm;
                observed += weight * confusion.count(i, j) as f64;
                expected += weight * (actual[i] as f64 * predicted[j] as f64) / n;
            }
        }

        if expected == 0.0 {
            return 1.0;
        }
        1.0 - observed / expected
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "qwk"
    }
}

// =============================================================================
// Mean Absolute Error
// =============================================================================

/// Mean `|predicted - true|` in grade units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanAbsoluteError;

impl MetricFn for MeanAbsoluteError {
    fn compute(&self, confusion: &ConfusionMatrix) -> f64 {
        let n = confusion.n_samples();
        if n == 0 {
            return 0.0;
        }
        let total: u64 = confusion
            .counts()
            .indexed_iter()
            .map(|((t, p), &c)| t.abs_diff(p) as u64 * c)
            .sum();
        total as f64 / n as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}

// =============================================================================
// Macro F1
// =============================================================================

/// Unweighted mean of per-grade F1.
///
/// Grades absent from both labels and predictions are skipped rather than
/// counted as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MacroF1;

impl MetricFn for MacroF1 {
    fn compute(&self, confusion: &ConfusionMatrix) -> f64 {
        let actual = confusion.actual_totals();
        let predicted = confusion.predicted_totals();

        let (sum, seen) = (0..confusion.num_classes())
            .filter(|&g| actual[g] + predicted[g] > 0)
            .fold((0.0f64, 0usize), |(sum, seen), g| {
                // 2·tp / (2·tp + fp + fn)
                let tp = confusion.count(g, g) as f64;
                let f1 = 2.0 * tp / (actual[g] + predicted[g]) as f64;
                (sum + f1, seen + 1)
            });

        if seen == 0 { 0.0 } else { sum / seen as f64 }
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "macro_f1"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::DEFAULT_TOLERANCE_F64;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn cm(predicted: &[usize], actual: &[usize]) -> ConfusionMatrix {
        ConfusionMatrix::from_grades(predicted, actual, 5).unwrap()
    }

    #[test]
    fn accuracy() {
        assert_abs_diff_eq!(Accuracy.compute(&cm(&[0, 1, 2, 3], &[0, 1, 2, 3])), 1.0);
        assert_abs_diff_eq!(Accuracy.compute(&cm(&[0, 1, 2, 3], &[0, 1, 3, 4])), 0.5);
        assert_eq!(Accuracy.compute(&cm(&[], &[])), 0.0);
    }

    #[test]
    fn mae() {
        let value = MeanAbsoluteError.compute(&cm(&[0, 2, 4, 1], &[0, 1, 2, 1]));
        assert_abs_diff_eq!(value, 0.75, epsilon = DEFAULT_TOLERANCE_F64);
    }

    #[rstest]
    #[case::perfect(&[0, 1, 2, 3, 4], &[0, 1, 2, 3, 4], 1.0)]
    #[case::reversed(&[4, 3, 2, 1, 0], &[0, 1, 2, 3, 4], -1.0)]
    #[case::constant_agreement(&[2, 2, 2], &[2, 2, 2], 1.0)]
    fn qwk_reference_values(#[case] predicted: &[usize], #[case] actual: &[usize], #[case] expected: f64) {
        let value = QuadraticWeightedKappa.compute(&cm(predicted, actual));
        assert_abs_diff_eq!(value, expected, epsilon = DEFAULT_TOLERANCE_F64);
    }

    #[test]
    fn qwk_penalizes_distant_errors_more() {
        let near = QuadraticWeightedKappa.compute(&cm(&[0, 1, 2, 4, 4], &[0, 1, 2, 3, 4]));
        let far = QuadraticWeightedKappa.compute(&cm(&[0, 1, 2, 0, 4], &[0, 1, 2, 3, 4]));
        assert!(near > far);
    }

    #[test]
    fn qwk_hand_computed() {
        // actual [0, 0, 1, 1], predicted [0, 1, 1, 1], K = 2
        let confusion = ConfusionMatrix::from_grades(&[0, 1, 1, 1], &[0, 0, 1, 1], 2).unwrap();
        // observed = 1, expected = (2 * 1 + 2 * 3) / 4 = 2
        let value = QuadraticWeightedKappa.compute(&confusion);
        assert_abs_diff_eq!(value, 0.5, epsilon = DEFAULT_TOLERANCE_F64);
    }

    #[test]
    fn macro_f1_skips_unseen_grades() {
        // grade 0: tp 1, actual 1, predicted 1 → 1.0
        // grade 1: tp 1, actual 2, predicted 1 → 2/3
        // grade 2: tp 0, actual 0, predicted 1 → 0.0
        let value = MacroF1.compute(&cm(&[0, 1, 2], &[0, 1, 1]));
        assert_abs_diff_eq!(value, (1.0 + 2.0 / 3.0) / 3.0, epsilon = DEFAULT_TOLERANCE_F64);
        assert_eq!(MacroF1.compute(&cm(&[], &[])), 0.0);
    }
}
