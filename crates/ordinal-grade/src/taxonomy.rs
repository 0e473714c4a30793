//! Severity taxonomy: display text attached to each grade.
//!
//! The taxonomy is plain configuration. It is supplied once (the default is the
//! Kellgren–Lawrence osteoarthritis scale), validated against `num_classes`,
//! and never mutated afterwards.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::inference::Grade;

/// Label and explanation for a single grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityInfo {
    /// Short label, e.g. `"Mild"`.
    pub severity: Cow<'static, str>,
    /// Longer human-readable explanation.
    pub explanation: Cow<'static, str>,
}

static UNKNOWN: SeverityInfo = SeverityInfo::borrowed("Unknown", "Unable to determine severity.");

impl SeverityInfo {
    /// Returned for grades the taxonomy has no entry for.
    pub fn unknown() -> &'static SeverityInfo {
        &UNKNOWN
    }

    pub fn new(severity: impl Into<Cow<'static, str>>, explanation: impl Into<Cow<'static, str>>) -> Self {
        Self {
            severity: severity.into(),
            explanation: explanation.into(),
        }
    }

    const fn borrowed(severity: &'static str, explanation: &'static str) -> Self {
        Self {
            severity: Cow::Borrowed(severity),
            explanation: Cow::Borrowed(explanation),
        }
    }
}

/// Errors raised while building a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    #[error("taxonomy has no entries")]
    Empty,

    #[error("grade {grade} has an empty {field}")]
    EmptyField { grade: Grade, field: &'static str },

    #[error("taxonomy has {got} entries but the model grades {expected} classes")]
    LengthMismatch { expected: usize, got: usize },
}

/// Kellgren–Lawrence grades 0..=4.
const KELLGREN_LAWRENCE: [SeverityInfo; 5] = [
    SeverityInfo::borrowed(
        "Normal",
        "No signs of osteoarthritis detected. Joint spaces appear normal with no significant \
         abnormalities such as osteophytes, joint space narrowing, or subchondral sclerosis.",
    ),
    SeverityInfo::borrowed(
        "Doubtful/Minimal",
        "Minimal changes detected. Possible early signs of minute osteophytes with doubtful \
         significance. Regular monitoring recommended to track progression.",
    ),
    SeverityInfo::borrowed(
        "Mild",
        "Mild osteoarthritis detected. Definite osteophytes present with possible joint space narrowing.",
    ),
    SeverityInfo::borrowed(
        "Moderate",
        "Moderate osteoarthritis detected. Multiple osteophytes, definite joint space narrowing, \
         some sclerosis, and possible deformity of bone ends.",
    ),
    SeverityInfo::borrowed(
        "Severe",
        "Severe osteoarthritis detected. Large osteophytes, marked joint space narrowing, severe \
         sclerosis, and definite bone end deformity.",
    ),
];

/// Ordered table of [`SeverityInfo`], one entry per grade.
///
/// # Example
///
/// ```
/// use ordinal_grade::taxonomy::SeverityTaxonomy;
///
/// let taxonomy = SeverityTaxonomy::kellgren_lawrence();
/// assert_eq!(taxonomy.lookup(2).severity, "Mild");
/// assert_eq!(taxonomy.lookup(9).severity, "Unknown");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SeverityInfo>", into = "Vec<SeverityInfo>")]
pub struct SeverityTaxonomy {
    entries: Vec<SeverityInfo>,
}

impl SeverityTaxonomy {
    /// Build a taxonomy, rejecting empty tables and blank strings.
    pub fn new(entries: Vec<SeverityInfo>) -> Result<Self, TaxonomyError> {
        if entries.is_empty() {
            return Err(TaxonomyError::Empty);
        }
        for (grade, info) in entries.iter().enumerate() {
            if info.severity.trim().is_empty() {
                return Err(TaxonomyError::EmptyField { grade, field: "severity" });
            }
            if info.explanation.trim().is_empty() {
                return Err(TaxonomyError::EmptyField { grade, field: "explanation" });
            }
        }
        Ok(Self { entries })
    }

    /// The five-grade Kellgren–Lawrence scale.
    pub fn kellgren_lawrence() -> Self {
        Self {
            entries: KELLGREN_LAWRENCE.to_vec(),
        }
    }

    /// Entry for `grade`, or [`SeverityInfo::unknown`].
    pub fn lookup(&self, grade: Grade) -> &SeverityInfo {
        self.entries.get(grade).unwrap_or(&UNKNOWN)
    }

    /// Number of grades covered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeverityInfo> {
        self.entries.iter()
    }

    /// Check that the table covers exactly `num_classes` grades.
    pub fn validate_for(&self, num_classes: usize) -> Result<(), TaxonomyError> {
        if self.entries.len() != num_classes {
            return Err(TaxonomyError::LengthMismatch {
                expected: num_classes,
                got: self.entries.len(),
            });
        }
        Ok(())
    }
}

impl Default for SeverityTaxonomy {
    fn default() -> Self {
        Self::kellgren_lawrence()
    }
}

impl TryFrom<Vec<SeverityInfo>> for SeverityTaxonomy {
    type Error = TaxonomyError;

    fn try_from(entries: Vec<SeverityInfo>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<SeverityTaxonomy> for Vec<SeverityInfo> {
    fn from(taxonomy: SeverityTaxonomy) -> Self {
        taxonomy.entries
    }
}
