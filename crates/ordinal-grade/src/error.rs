//! Crate-wide error type.
//!
//! Encoding, loss and decoding failures are local precondition violations and
//! are returned to the caller immediately. Comparator-level failures are not
//! raised at all; they are folded into [`DualReport`](crate::compare::DualReport).
//!
//! Boundary layers (HTTP handlers, CLIs) map errors to responses through
//! [`GradeError::kind`] instead of matching on variants.

use std::io;

use serde::{Deserialize, Serialize};

use crate::model::ConfigError;

/// Result alias used throughout the crate.
pub type Result<T, E = GradeError> = std::result::Result<T, E>;

/// Coarse failure category, stable across variant changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A grade or label outside `[0, num_classes - 1]`.
    Range,
    /// A score vector or batch with the wrong dimensions.
    Shape,
    /// A score outside the numeric domain an operation requires.
    Domain,
    /// A classifier could not produce a result.
    Upstream,
    /// Invalid configuration or taxonomy.
    Config,
    /// Reading or parsing external input failed.
    Io,
}

/// Errors produced by grading operations.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    #[error("grade {grade} out of range for {num_classes} classes")]
    Range { grade: usize, num_classes: usize },

    #[error("expected {expected} threshold scores, got {got}")]
    Shape { expected: usize, got: usize },

    #[error("{what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("score {value} at threshold {index} must lie strictly inside (0, 1)")]
    OutOfDomain { index: usize, value: f32 },

    #[error("model '{model}' unavailable: {reason}")]
    UpstreamUnavailable { model: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GradeError {
    /// The coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Range { .. } => ErrorKind::Range,
            Self::Shape { .. } | Self::DimensionMismatch { .. } => ErrorKind::Shape,
            Self::OutOfDomain { .. } => ErrorKind::Domain,
            Self::UpstreamUnavailable { .. } => ErrorKind::Upstream,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) | Self::Json(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn shape(expected: usize, got: usize) -> Self {
        Self::Shape { expected, got }
    }
}

/// Check that `got` scores match the `num_classes - 1` thresholds.
pub(crate) fn check_thresholds(num_classes: usize, got: usize) -> Result<()> {
    if num_classes < 2 {
        return Err(ConfigError::TooFewClasses(num_classes).into());
    }
    let expected = num_classes - 1;
    if got != expected {
        return Err(GradeError::shape(expected, got));
    }
    Ok(())
}
