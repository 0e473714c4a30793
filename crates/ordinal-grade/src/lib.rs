//! ordinal-grade: ordinal (CORAL) severity grading.
//!
//! Grades are `K` ordered classes. A CORAL model predicts `K - 1` cumulative
//! scores `s[i] ≈ P(grade > i)`; this crate turns grades into that encoding for
//! training, scores them with the matching loss, decodes raw scores back into
//! a grade plus a full per-grade distribution, and compares two classifiers'
//! results for the same input.
//!
//! # Key Types
//!
//! - [`OrdinalDecoder`] / [`PredictionResult`] - Decoding raw threshold scores
//! - [`GradingService`] - Registry of backbones with grading and comparison
//! - [`Comparator`] / [`DualReport`] - Agreement between two classifiers
//! - [`GradingConfig`] - Validated configuration builder
//! - [`OrdinalLoss`] / [`Evaluator`] - Training loss and evaluation metrics
//!
//! # Decoding
//!
//! ```
//! use ordinal_grade::inference::{decode, decode_grade};
//!
//! assert_eq!(decode_grade(&[0.9, 0.8, 0.3, 0.1]), 2);
//!
//! let result = decode(&[0.9, 0.8, 0.3, 0.1], 5).unwrap();
//! assert_eq!(result.grade(), 2);
//! assert!((result.distribution().iter().sum::<f32>() - 1.0).abs() < 1e-6);
//! ```

// Re-export approx traits for users who want to compare distributions
pub use approx;

pub mod compare;
pub mod error;
pub mod inference;
pub mod model;
pub mod taxonomy;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use compare::{Comparator, ComparisonResult, DualReport, HigherConfidence};
pub use error::{ErrorKind, GradeError, Result};
pub use inference::{
    Backbone, DistributionCorrection, Grade, GradeReport, GradingService, OrdinalDecoder,
    PredictionResult,
};
pub use model::{GradingConfig, ModelKind, ModelMeta, ScoreTransform};
pub use taxonomy::{SeverityInfo, SeverityTaxonomy};
pub use training::{
    encode_ordinal_batch, encode_ordinal_label, ordinal_loss, EvaluationReport, Evaluator, Metric,
    MetricFn, ObjectiveFn, OrdinalLoss,
};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
