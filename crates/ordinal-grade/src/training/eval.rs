//! Evaluation of graded predictions against true labels.
//!
//! Provides the [`Evaluator`] component for computing a set of metrics in one
//! pass, and [`MetricValue`] for wrapping computed metrics with metadata.

use std::fmt;

use serde::Serialize;

use super::metrics::{ConfusionMatrix, Metric, MetricFn};
use crate::error::Result;
use crate::inference::{Grade, PredictionResult};

// =============================================================================
// MetricValue
// =============================================================================

/// A computed metric value with metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricValue {
    /// Name of the metric (e.g., "accuracy", "qwk").
    pub name: String,
    /// The computed value.
    pub value: f64,
    /// Whether higher values are better (true for accuracy, false for MAE).
    pub higher_is_better: bool,
}

impl MetricValue {
    pub fn new(name: impl Into<String>, value: f64, higher_is_better: bool) -> Self {
        Self {
            name: name.into(),
            value,
            higher_is_better,
        }
    }

    /// Returns true if this value is better than another.
    pub fn is_better_than(&self, other: &Self) -> bool {
        if self.higher_is_better {
            self.value > other.value
        } else {
            self.value < other.value
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.4}", self.name, self.value)
    }
}

// =============================================================================
// EvaluationReport
// =============================================================================

/// Metrics and confusion matrix for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub num_classes: usize,
    pub n_samples: u64,
    pub metrics: Vec<MetricValue>,
    pub confusion_matrix: ConfusionMatrix,
}

impl EvaluationReport {
    /// Value of the named metric, if it was computed.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.iter().find(|m| m.name == name).map(|m| m.value)
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Computes a fixed set of metrics over predicted and true grades.
///
/// # Example
///
/// ```
/// use ordinal_grade::training::Evaluator;
///
/// let report = Evaluator::new(5).evaluate(&[0, 1, 2, 4], &[0, 1, 2, 3]).unwrap();
/// assert_eq!(report.get("accuracy"), Some(0.75));
/// assert_eq!(report.get("mae"), Some(0.25));
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    num_classes: usize,
    metrics: Vec<Metric>,
}

impl Evaluator {
    /// Evaluator reporting [`Metric::all`].
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            metrics: Metric::all(),
        }
    }

    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Evaluate predicted grades against true grades.
    pub fn evaluate(&self, predicted: &[Grade], actual: &[Grade]) -> Result<EvaluationReport> {
        let confusion = ConfusionMatrix::from_grades(predicted, actual, self.num_classes)?;

        let metrics: Vec<MetricValue> = self
            .metrics
            .iter()
            .map(|m| MetricValue::new(m.name(), m.compute(&confusion), m.higher_is_better()))
            .collect();

        for metric in &metrics {
            tracing::debug!(metric = %metric.name, value = metric.value, "computed metric");
        }

        Ok(EvaluationReport {
            num_classes: self.num_classes,
            n_samples: confusion.n_samples(),
            metrics,
            confusion_matrix: confusion,
        })
    }

    /// Evaluate decoded predictions against true grades.
    pub fn evaluate_predictions(
        &self,
        predictions: &[PredictionResult],
        actual: &[Grade],
    ) -> Result<EvaluationReport> {
        let predicted: Vec<Grade> = predictions.iter().map(PredictionResult::grade).collect();
        self.evaluate(&predicted, actual)
    }
}
