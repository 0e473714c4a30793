//! Backbone contract.
//!
//! A backbone is the opaque feature extractor plus head that turns a
//! preprocessed image into raw scores. Loading weights, resizing and
//! normalization all happen outside this crate; the only thing checked here
//! is the shape of what comes back.

use ndarray::ArrayView3;

/// Errors a backbone may report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackboneError {
    #[error("input shape {got:?} not accepted, expected {expected:?}")]
    InputShape { expected: Vec<usize>, got: Vec<usize> },

    #[error("inference failed: {0}")]
    Inference(String),
}

/// A loaded model producing raw scores for one preprocessed image.
///
/// The image is a `(channels, height, width)` tensor, already resized and
/// normalized. Ordinal backbones return `num_classes - 1` scores, categorical
/// ones return `num_classes`.
///
/// Implementations hold immutable weights and are shared across request
/// threads, hence `Send + Sync`.
pub trait Backbone: Send + Sync {
    fn forward(&self, image: ArrayView3<'_, f32>) -> Result<Vec<f32>, BackboneError>;
}

impl<F> Backbone for F
where
    F: Fn(ArrayView3<'_, f32>) -> Result<Vec<f32>, BackboneError> + Send + Sync,
{
    fn forward(&self, image: ArrayView3<'_, f32>) -> Result<Vec<f32>, BackboneError> {
        self(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn mean_backbone(image: ArrayView3<'_, f32>) -> Result<Vec<f32>, BackboneError> {
        let mean = image.mean().unwrap_or(0.0);
        Ok(vec![mean; 4])
    }

    #[test]
    fn functions_are_backbones() {
        let image = Array3::from_elem((3, 2, 2), 0.25f32);
        assert_eq!(mean_backbone.forward(image.view()).unwrap(), vec![0.25; 4]);

        let shared: std::sync::Arc<dyn Backbone> = std::sync::Arc::new(mean_backbone);
        assert_eq!(shared.forward(image.view()).unwrap().len(), 4);
    }

    #[test]
    fn error_messages() {
        let err = BackboneError::InputShape {
            expected: vec![3, 224, 224],
            got: vec![1, 224, 224],
        };
        assert_eq!(
            err.to_string(),
            "input shape [1, 224, 224] not accepted, expected [3, 224, 224]"
        );
    }
}
