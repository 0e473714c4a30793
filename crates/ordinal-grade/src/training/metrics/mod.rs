//! Evaluation metrics for graded predictions.
//!
//! Every metric here is a function of the [`ConfusionMatrix`] between true and
//! predicted grades, so the matrix is built (and validated) once and shared.
//!
//! # Available Metrics
//!
//! - [`Accuracy`]: fraction of exact matches
//! - [`QuadraticWeightedKappa`]: Cohen's kappa with squared-distance weights
//! - [`MeanAbsoluteError`]: mean absolute grade distance
//! - [`MacroF1`]: unweighted mean F1 over grades seen in either labels or predictions

mod confusion;
mod ordinal;

pub use confusion::ConfusionMatrix;
pub use ordinal::{Accuracy, MacroF1, MeanAbsoluteError, QuadraticWeightedKappa};

// =============================================================================
// MetricFn Trait
// =============================================================================

/// A scalar summary of a confusion matrix.
pub trait MetricFn: Send + Sync {
    /// Compute the metric value. An empty matrix yields 0.
    fn compute(&self, confusion: &ConfusionMatrix) -> f64;

    /// Whether higher values indicate better performance.
    ///
    /// - `true`: Higher is better (accuracy, kappa, F1)
    /// - `false`: Lower is better (MAE)
    fn higher_is_better(&self) -> bool;

    /// Name of the metric (for logging and reports).
    fn name(&self) -> &'static str;
}

// =============================================================================
// Metric Enum (Convenience wrapper)
// =============================================================================

/// Runtime-selectable metric.
///
/// # Example
///
/// ```
/// use ordinal_grade::training::{ConfusionMatrix, Metric, MetricFn};
///
/// let confusion = ConfusionMatrix::from_grades(&[0, 1, 2], &[0, 1, 1], 3).unwrap();
/// assert!((Metric::accuracy().compute(&confusion) - 2.0 / 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Accuracy(Accuracy),
    Qwk(QuadraticWeightedKappa),
    Mae(MeanAbsoluteError),
    MacroF1(MacroF1),
}

impl Metric {
    pub fn accuracy() -> Self {
        Self::Accuracy(Accuracy)
    }

    pub fn qwk() -> Self {
        Self::Qwk(QuadraticWeightedKappa)
    }

    pub fn mae() -> Self {
        Self::Mae(MeanAbsoluteError)
    }

    pub fn macro_f1() -> Self {
        Self::MacroF1(MacroF1)
    }

    /// The metrics reported by default, in report order.
    pub fn all() -> Vec<Self> {
        vec![Self::accuracy(), Self::qwk(), Self::mae(), Self::macro_f1()]
    }

    /// Look up a metric by its [`name`](MetricFn::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|m| m.name() == name)
    }
}

impl MetricFn for Metric {
    fn compute(&self, confusion: &ConfusionMatrix) -> f64 {
        match self {
            Self::Accuracy(inner) => inner.compute(confusion),
            Self::Qwk(inner) => inner.compute(confusion),
            Self::Mae(inner) => inner.compute(confusion),
            Self::MacroF1(inner) => inner.compute(confusion),
        }
    }

    fn higher_is_better(&self) -> bool {
        match self {
            Self::Accuracy(inner) => inner.higher_is_better(),
            Self::Qwk(inner) => inner.higher_is_better(),
            Self::Mae(inner) => inner.higher_is_better(),
            Self::MacroF1(inner) => inner.higher_is_better(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Accuracy(inner) => inner.name(),
            Self::Qwk(inner) => inner.name(),
            Self::Mae(inner) => inner.name(),
            Self::MacroF1(inner) => inner.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(Metric::from_name("qwk"), Some(Metric::qwk()));
        assert_eq!(Metric::from_name("mae"), Some(Metric::mae()));
        assert_eq!(Metric::from_name("rmse"), None);
        assert!(!Metric::mae().higher_is_better());
        assert!(Metric::macro_f1().higher_is_better());
    }
}
