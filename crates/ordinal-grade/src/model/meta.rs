//! Model metadata.
//!
//! Describes a registered backbone: how to read its output and how to
//! present it.

use serde::{Deserialize, Serialize};

use super::ScoreTransform;

/// How a backbone's output encodes the grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// CORAL head: `num_classes - 1` cumulative scores, `s[i] ≈ P(grade > i)`.
    #[default]
    Ordinal,
    /// Plain classifier: `num_classes` per-grade probabilities.
    Categorical,
}

impl ModelKind {
    /// Number of raw outputs a backbone of this kind must produce.
    pub fn n_outputs(&self, num_classes: usize) -> usize {
        match self {
            Self::Ordinal => num_classes.saturating_sub(1),
            Self::Categorical => num_classes,
        }
    }

    /// Returns true for ordinal-aware models.
    pub fn is_ordinal(&self) -> bool {
        matches!(self, Self::Ordinal)
    }
}

/// Metadata attached to a registered backbone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Registry name, e.g. `"coral"`.
    pub name: String,
    /// Display name, e.g. `"CORAL Ordinal Regression (EfficientNet-B0)"`.
    pub model_type: String,
    /// One-paragraph description.
    pub description: String,
    /// Output encoding.
    #[serde(default)]
    pub kind: ModelKind,
    /// Squashing applied to raw outputs before decoding.
    #[serde(default)]
    pub transform: ScoreTransform,
}

impl ModelMeta {
    /// Metadata for an ordinal backbone whose head already applies a sigmoid.
    pub fn ordinal(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            model_type: format!("{name} (CORAL ordinal regression)"),
            description: "Uses ordinal regression with CORAL loss to predict ordered grades. \
                          Leverages the ordinal nature of severity levels for more consistent \
                          predictions."
                .to_string(),
            name,
            kind: ModelKind::Ordinal,
            transform: ScoreTransform::Identity,
        }
    }

    /// Metadata for a categorical backbone whose head already applies a softmax.
    pub fn categorical(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            model_type: format!("{name} (categorical classifier)"),
            description: "Treats each grade as an independent class and predicts with a softmax \
                          over all grades."
                .to_string(),
            name,
            kind: ModelKind::Categorical,
            transform: ScoreTransform::Identity,
        }
    }

    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = model_type.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_transform(mut self, transform: ScoreTransform) -> Self {
        self.transform = transform;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_counts() {
        assert_eq!(ModelKind::Ordinal.n_outputs(5), 4);
        assert_eq!(ModelKind::Categorical.n_outputs(5), 5);
        assert_eq!(ModelKind::Ordinal.n_outputs(0), 0);
    }

    #[test]
    fn builders() {
        let meta = ModelMeta::ordinal("coral").with_transform(ScoreTransform::Sigmoid);
        assert_eq!(meta.name, "coral");
        assert!(meta.kind.is_ordinal());
        assert_eq!(meta.transform, ScoreTransform::Sigmoid);

        let meta = ModelMeta::categorical("resnet50").with_model_type("ResNet50");
        assert_eq!(meta.model_type, "ResNet50");
        assert!(!meta.kind.is_ordinal());
    }

    #[test]
    fn deserialize_with_defaults() {
        let meta: ModelMeta = serde_json::from_str(
            r#"{"name": "coral", "model_type": "CORAL", "description": "d"}"#,
        )
        .unwrap();
        assert_eq!(meta.kind, ModelKind::Ordinal);
        assert_eq!(meta.transform, ScoreTransform::Identity);
    }
}
