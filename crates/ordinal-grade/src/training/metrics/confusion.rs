//! Confusion matrix over ordered grades.

use std::fmt;

use ndarray::{Array2, ArrayView2};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::error::{GradeError, Result};
use crate::inference::Grade;
use crate::model::ConfigError;
use crate::training::encoding::check_grade;

/// Counts indexed `[true grade, predicted grade]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Array2<u64>,
    n_samples: u64,
}

impl ConfusionMatrix {
    /// Tally paired predicted and true grades.
    ///
    /// # Errors
    ///
    /// - [`GradeError::DimensionMismatch`] if the slices differ in length
    /// - [`GradeError::Range`] for any grade `>= num_classes`
    pub fn from_grades(predicted: &[Grade], actual: &[Grade], num_classes: usize) -> Result<Self> {
        if num_classes < 2 {
            return Err(ConfigError::TooFewClasses(num_classes).into());
        }
        if predicted.len() != actual.len() {
            return Err(GradeError::DimensionMismatch {
                what: "predictions per label",
                expected: actual.len(),
                got: predicted.len(),
            });
        }

        let mut counts = Array2::<u64>::zeros((num_classes, num_classes));
        for (&p, &t) in predicted.iter().zip(actual) {
            check_grade(p, num_classes)?;
            check_grade(t, num_classes)?;
            counts[[t, p]] += 1;
        }

        Ok(Self {
            counts,
            n_samples: predicted.len() as u64,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.counts.nrows()
    }

    pub fn n_samples(&self) -> u64 {
        self.n_samples
    }

    /// Number of samples with true grade `actual` predicted as `predicted`.
    pub fn count(&self, actual: Grade, predicted: Grade) -> u64 {
        self.counts.get((actual, predicted)).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> ArrayView2<'_, u64> {
        self.counts.view()
    }

    /// Samples per true grade.
    pub fn actual_totals(&self) -> Vec<u64> {
        self.counts.rows().into_iter().map(|r| r.sum()).collect()
    }

    /// Samples per predicted grade.
    pub fn predicted_totals(&self) -> Vec<u64> {
        self.counts.columns().into_iter().map(|c| c.sum()).collect()
    }

    /// Exact matches.
    pub fn correct(&self) -> u64 {
        self.counts.diag().sum()
    }
}

impl Serialize for ConfusionMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.counts.nrows()))?;
        for row in self.counts.rows() {
            seq.serialize_element(&row.to_vec())?;
        }
        seq.end()
    }
}

/// Aligned text table, true grades down, predicted grades across.
impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .iter()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1)
            .max(self.num_classes().to_string().len())
            .max(2);

        write!(f, "{:>6}", "true\\p")?;
        for p in 0..self.num_classes() {
            write!(f, " {p:>width$}")?;
        }
        for (t, row) in self.counts.rows().into_iter().enumerate() {
            write!(f, "\n{t:>6}")?;
            for c in row {
                write!(f, " {c:>width$}")?;
            }
        }
        Ok(())
    }
}
