//! Testing utilities for ordinal-grade.
//!
//! Shared tolerances and stub backbones for unit tests, integration tests,
//! doc examples and benchmarks.
//!
//! ```
//! use ordinal_grade::inference::Backbone;
//! use ordinal_grade::testing::{FailingBackbone, FixedBackbone};
//! use ndarray::Array3;
//!
//! let image = Array3::<f32>::zeros((3, 4, 4));
//! assert_eq!(FixedBackbone::new(vec![0.7]).forward(image.view()).unwrap(), vec![0.7]);
//! assert!(FailingBackbone::new("no weights").forward(image.view()).is_err());
//! ```

use ndarray::ArrayView3;

use crate::inference::{Backbone, BackboneError};

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for floating point comparisons.
/// This is appropriate for probabilities and losses, which are O(1).
pub const DEFAULT_TOLERANCE: f32 = 1e-5;

/// Same tolerance as f64, for metrics.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-5;

// =============================================================================
// Stub backbones
// =============================================================================

/// Backbone returning the same scores for every image.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBackbone {
    scores: Vec<f32>,
}

impl FixedBackbone {
    pub fn new(scores: Vec<f32>) -> Self {
        Self { scores }
    }
}

impl Backbone for FixedBackbone {
    fn forward(&self, _image: ArrayView3<'_, f32>) -> Result<Vec<f32>, BackboneError> {
        Ok(self.scores.clone())
    }
}

/// Backbone that always fails with [`BackboneError::Inference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailingBackbone {
    reason: String,
}

impl FailingBackbone {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Backbone for FailingBackbone {
    fn forward(&self, _image: ArrayView3<'_, f32>) -> Result<Vec<f32>, BackboneError> {
        Err(BackboneError::Inference(self.reason.clone()))
    }
}
