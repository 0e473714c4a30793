//! Display-ready grading report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PredictionResult;
use crate::model::{ModelKind, ModelMeta};
use crate::taxonomy::SeverityTaxonomy;

/// A [`PredictionResult`] decorated with taxonomy text and model metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    /// Registry name of the model that produced the prediction.
    pub model: String,
    pub model_type: String,
    pub model_description: String,
    pub kind: ModelKind,
    pub severity: String,
    pub explanation: String,
    /// Confidence as a percentage, two decimals.
    pub confidence_percent: f64,
    /// `grade_0`..`grade_{K-1}` → probability.
    pub probabilities: BTreeMap<String, f32>,
    pub prediction: PredictionResult,
}

impl GradeReport {
    pub fn new(meta: &ModelMeta, prediction: PredictionResult, taxonomy: &SeverityTaxonomy) -> Self {
        let info = taxonomy.lookup(prediction.grade());
        let probabilities = prediction
            .distribution()
            .iter()
            .enumerate()
            .map(|(i, &p)| (format!("grade_{i}"), p))
            .collect();

        Self {
            model: meta.name.clone(),
            model_type: meta.model_type.clone(),
            model_description: meta.description.clone(),
            kind: meta.kind,
            severity: info.severity.to_string(),
            explanation: info.explanation.to_string(),
            confidence_percent: prediction.confidence_percent(),
            probabilities,
            prediction,
        }
    }

    /// `P(grade > i)` lines for ordinal models, in threshold order.
    pub fn threshold_probabilities(&self) -> Option<&[f32]> {
        self.kind.is_ordinal().then(|| self.prediction.raw_scores())
    }
}
