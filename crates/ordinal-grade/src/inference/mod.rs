//! Inference: turning backbone output into graded predictions.
//!
//! - [`decode()`], [`decode_grade`] and [`OrdinalDecoder`]: CORAL threshold scores to grades
//! - [`Backbone`]: the contract a loaded model satisfies
//! - [`GradeReport`]: prediction decorated with taxonomy text
//! - [`GradingService`]: model registry with single and side-by-side grading

mod backbone;
mod decode;
mod report;
mod service;

pub use backbone::{Backbone, BackboneError};
pub use decode::{
    decode, decode_distribution, decode_grade, is_rank_consistent, DistributionCorrection,
    OrdinalDecoder, PredictionResult,
};
pub use report::GradeReport;
pub use service::{GradingService, HealthStatus, ModelHealth};

/// A grade index in `[0, num_classes - 1]`.
pub type Grade = usize;

impl From<&crate::model::GradingConfig> for OrdinalDecoder {
    fn from(config: &crate::model::GradingConfig) -> Self {
        OrdinalDecoder::new(config.num_classes).with_correction(config.correction)
    }
}
