//! Agreement reports between two independently produced predictions.
//!
//! [`Comparator::compare`] is a pure function of two [`PredictionResult`]s.
//! [`Comparator::compare_outcomes`] accepts the possibly-failed outcome of each
//! classifier and always returns a [`DualReport`]; a failed side is reported
//! inline and the comparison section is omitted.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, GradeError};
use crate::inference::{GradeReport, PredictionResult};
use crate::taxonomy::SeverityTaxonomy;

/// Which side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

/// Side with strictly higher confidence, or a tie on exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HigherConfidence {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "tie")]
    Tie,
}

/// Agreement between two predictions for the same input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub grades_match: bool,
    pub grade_difference: usize,
    pub higher_confidence: HigherConfidence,
    pub analysis: String,
}

/// Error marker replacing a side that produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideError {
    pub error: String,
    pub kind: ErrorKind,
}

impl From<&GradeError> for SideError {
    fn from(err: &GradeError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}

/// One side of a [`DualReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SideOutcome {
    Graded(Box<GradeReport>),
    Failed(SideError),
}

impl SideOutcome {
    pub fn report(&self) -> Option<&GradeReport> {
        match self {
            Self::Graded(report) => Some(report),
            Self::Failed(_) => None,
        }
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.report().map(|r| &r.prediction)
    }

    pub fn error(&self) -> Option<&SideError> {
        match self {
            Self::Graded(_) => None,
            Self::Failed(err) => Some(err),
        }
    }
}

/// Both sides plus their comparison, if both succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualReport {
    pub a: SideOutcome,
    pub b: SideOutcome,
    pub comparison: Option<ComparisonResult>,
}

/// Builds [`ComparisonResult`]s with taxonomy labels.
#[derive(Debug, Clone)]
pub struct Comparator<'a> {
    taxonomy: &'a SeverityTaxonomy,
    label_a: String,
    label_b: String,
    ordinal_side: Option<Side>,
}

impl<'a> Comparator<'a> {
    pub fn new(taxonomy: &'a SeverityTaxonomy) -> Self {
        Self {
            taxonomy,
            label_a: "Model A".to_string(),
            label_b: "Model B".to_string(),
            ordinal_side: None,
        }
    }

    /// Names used for each side in the analysis text.
    pub fn with_labels(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.label_a = a.into();
        self.label_b = b.into();
        self
    }

    /// Mark which side is the ordinal-aware model, if exactly one is.
    pub fn with_ordinal_side(mut self, side: Option<Side>) -> Self {
        self.ordinal_side = side;
        self
    }

    /// Compare two successful predictions.
    pub fn compare(&self, a: &PredictionResult, b: &PredictionResult) -> ComparisonResult {
        let grades_match = a.grade() == b.grade();
        let grade_difference = a.grade().abs_diff(b.grade());
        let higher_confidence = if a.confidence() > b.confidence() {
            HigherConfidence::A
        } else if b.confidence() > a.confidence() {
            HigherConfidence::B
        } else {
            HigherConfidence::Tie
        };

        let analysis = if grades_match {
            self.agreement(a, b)
        } else {
            self.disagreement(a, b, grade_difference)
        };

        ComparisonResult {
            grades_match,
            grade_difference,
            higher_confidence,
            analysis,
        }
    }

    /// Combine two outcomes; never fails.
    pub fn compare_outcomes(
        &self,
        a: Result<GradeReport, GradeError>,
        b: Result<GradeReport, GradeError>,
    ) -> DualReport {
        let a = into_outcome(a, &self.label_a);
        let b = into_outcome(b, &self.label_b);

        let comparison = match (a.prediction(), b.prediction()) {
            (Some(pa), Some(pb)) => Some(self.compare(pa, pb)),
            _ => None,
        };

        DualReport { a, b, comparison }
    }

    fn agreement(&self, a: &PredictionResult, b: &PredictionResult) -> String {
        let label = &self.taxonomy.lookup(a.grade()).severity;
        format!(
            "Both models agree on Grade {} ({}). {} confidence: {:.2}%, {} confidence: {:.2}%.",
            a.grade(),
            label,
            self.label_a,
            a.confidence_percent(),
            self.label_b,
            b.confidence_percent(),
        )
    }

    fn disagreement(&self, a: &PredictionResult, b: &PredictionResult, difference: usize) -> String {
        let mut text = format!(
            "{} predicts Grade {} ({}) with {:.2}% confidence, while {} predicts Grade {} ({}) with {:.2}% confidence.",
            self.label_a,
            a.grade(),
            self.taxonomy.lookup(a.grade()).severity,
            a.confidence_percent(),
            self.label_b,
            b.grade(),
            self.taxonomy.lookup(b.grade()).severity,
            b.confidence_percent(),
        );

        let levels = if difference == 1 { "level" } else { "levels" };
        text.push_str(&format!(" The predictions differ by {difference} {levels}; "));
        let recommendation = match self.ordinal_side {
            Some(Side::A) => format!("{} is ordinal-aware and is recommended for consistent grading.", self.label_a),
            Some(Side::B) => format!("{} is ordinal-aware and is recommended for consistent grading.", self.label_b),
            None => "favor the ordinal-aware model for consistent grading.".to_string(),
        };
        text.push_str(&recommendation);
        text
    }
}

fn into_outcome(result: Result<GradeReport, GradeError>, label: &str) -> SideOutcome {
    match result {
        Ok(report) => SideOutcome::Graded(Box::new(report)),
        Err(err) => {
            tracing::warn!(side = label, error = %err, "comparison side unavailable");
            SideOutcome::Failed(SideError::from(&err))
        }
    }
}
