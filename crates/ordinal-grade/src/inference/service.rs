//! Model registry and grading entry points.
//!
//! [`GradingService`] owns the validated [`GradingConfig`] and every registered
//! backbone. It is immutable after setup and shared by reference across
//! request threads; backbones are `Send + Sync` and hold their own weights.

use std::sync::Arc;

use ndarray::ArrayView3;
use serde::Serialize;

use super::{Backbone, GradeReport, OrdinalDecoder, PredictionResult};
use crate::compare::{Comparator, DualReport, Side};
use crate::error::{GradeError, Result};
use crate::model::{ConfigError, GradingConfig, ModelKind, ModelMeta};

// =============================================================================
// Registry entries
// =============================================================================

enum ModelState {
    Loaded(Arc<dyn Backbone>),
    Unavailable(String),
}

struct RegisteredModel {
    meta: ModelMeta,
    state: ModelState,
}

impl RegisteredModel {
    fn is_loaded(&self) -> bool {
        matches!(self.state, ModelState::Loaded(_))
    }
}

/// Load state of one registered model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelHealth {
    pub name: String,
    pub kind: ModelKind,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Service-wide load state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// True when every registered model is loaded.
    pub healthy: bool,
    pub models: Vec<ModelHealth>,
}

// =============================================================================
// GradingService
// =============================================================================

/// Registry of backbones plus the decoding configuration they share.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ndarray::Array3;
/// use ordinal_grade::inference::GradingService;
/// use ordinal_grade::model::{GradingConfig, ModelMeta};
/// use ordinal_grade::testing::FixedBackbone;
///
/// let mut service = GradingService::new(GradingConfig::default()).unwrap();
/// service
///     .register(ModelMeta::ordinal("coral"), Arc::new(FixedBackbone::new(vec![0.9, 0.8, 0.3, 0.1])))
///     .unwrap();
///
/// let image = Array3::<f32>::zeros((3, 224, 224));
/// let report = service.grade("coral", image.view()).unwrap();
/// assert_eq!(report.severity, "Mild");
/// ```
pub struct GradingService {
    config: GradingConfig,
    decoder: OrdinalDecoder,
    models: Vec<RegisteredModel>,
}

impl std::fmt::Debug for GradingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.models.iter().map(|m| m.meta.name.as_str()).collect();
        f.debug_struct("GradingService")
            .field("config", &self.config)
            .field("models", &names)
            .finish()
    }
}

impl GradingService {
    /// Create an empty service. The configuration is validated here.
    pub fn new(config: GradingConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            num_classes = config.num_classes,
            correction = ?config.correction,
            "grading service initialized"
        );
        Ok(Self {
            decoder: OrdinalDecoder::from(&config),
            config,
            models: Vec::new(),
        })
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    pub fn decoder(&self) -> &OrdinalDecoder {
        &self.decoder
    }

    /// Metadata of every registered model, in registration order.
    pub fn models(&self) -> impl Iterator<Item = &ModelMeta> {
        self.models.iter().map(|m| &m.meta)
    }

    /// Register a loaded backbone under `meta.name`.
    pub fn register(&mut self, meta: ModelMeta, backbone: Arc<dyn Backbone>) -> Result<()> {
        self.insert(meta, ModelState::Loaded(backbone))
    }

    /// Register a model whose weights failed to load.
    ///
    /// Requests against it fail with [`GradeError::UpstreamUnavailable`].
    pub fn register_unavailable(&mut self, meta: ModelMeta, reason: impl Into<String>) -> Result<()> {
        let reason = reason.into();
        tracing::warn!(model = %meta.name, %reason, "model registered as unavailable");
        self.insert(meta, ModelState::Unavailable(reason))
    }

    fn insert(&mut self, meta: ModelMeta, state: ModelState) -> Result<()> {
        if self.find(&meta.name).is_some() {
            return Err(ConfigError::DuplicateModel(meta.name).into());
        }
        tracing::info!(model = %meta.name, kind = ?meta.kind, "model registered");
        self.models.push(RegisteredModel { meta, state });
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&RegisteredModel> {
        self.models.iter().find(|m| m.meta.name == name)
    }

    /// Run one backbone and decode its output.
    #[tracing::instrument(level = "debug", skip(self, image))]
    pub fn predict(&self, model: &str, image: ArrayView3<'_, f32>) -> Result<PredictionResult> {
        self.run(model, image).map(|(_, prediction)| prediction)
    }

    /// Grade one image with one model.
    #[tracing::instrument(skip(self, image))]
    pub fn grade(&self, model: &str, image: ArrayView3<'_, f32>) -> Result<GradeReport> {
        let (meta, prediction) = self.run(model, image)?;
        Ok(GradeReport::new(meta, prediction, &self.config.taxonomy))
    }

    fn run(&self, model: &str, image: ArrayView3<'_, f32>) -> Result<(&ModelMeta, PredictionResult)> {
        let entry = self.find(model).ok_or_else(|| GradeError::UpstreamUnavailable {
            model: model.to_string(),
            reason: "not registered".to_string(),
        })?;

        let backbone = match &entry.state {
            ModelState::Loaded(backbone) => backbone,
            ModelState::Unavailable(reason) => {
                return Err(GradeError::UpstreamUnavailable {
                    model: model.to_string(),
                    reason: reason.clone(),
                });
            }
        };

        let mut scores = backbone
            .forward(image)
            .map_err(|err| GradeError::UpstreamUnavailable {
                model: model.to_string(),
                reason: err.to_string(),
            })?;
        let expected = entry.meta.kind.n_outputs(self.config.num_classes);
        if scores.len() != expected {
            return Err(GradeError::DimensionMismatch {
                what: "backbone outputs",
                expected,
                got: scores.len(),
            });
        }
        entry.meta.transform.apply_inplace(&mut scores);

        let prediction = match entry.meta.kind {
            ModelKind::Ordinal => self.decoder.decode(&scores)?,
            ModelKind::Categorical => self.decoder.decode_categorical(&scores)?,
        };
        Ok((&entry.meta, prediction))
    }

    /// Grade one image with two models and compare them.
    ///
    /// Never fails: a model that can't produce a result is reported inline and
    /// the comparison section is left empty. This covers every error of
    /// [`grade`](Self::grade), not just upstream ones; a backbone returning the
    /// wrong number of outputs shows up as a side with kind `shape`.
    #[tracing::instrument(skip(self, image))]
    pub fn compare(&self, model_a: &str, model_b: &str, image: ArrayView3<'_, f32>) -> DualReport {
        let (outcome_a, outcome_b) = rayon::join(
            || self.grade(model_a, image),
            || self.grade(model_b, image),
        );

        let kind_a = self.find(model_a).map(|m| m.meta.kind);
        let kind_b = self.find(model_b).map(|m| m.meta.kind);
        let ordinal_side = match (kind_a, kind_b) {
            (Some(ModelKind::Ordinal), Some(ModelKind::Categorical)) => Some(Side::A),
            (Some(ModelKind::Categorical), Some(ModelKind::Ordinal)) => Some(Side::B),
            _ => None,
        };

        Comparator::new(&self.config.taxonomy)
            .with_labels(self.label(model_a), self.label(model_b))
            .with_ordinal_side(ordinal_side)
            .compare_outcomes(outcome_a, outcome_b)
    }

    fn label(&self, model: &str) -> String {
        self.find(model)
            .map(|m| m.meta.model_type.clone())
            .unwrap_or_else(|| model.to_string())
    }

    /// Load state of every registered model.
    pub fn health(&self) -> HealthStatus {
        let models: Vec<ModelHealth> = self
            .models
            .iter()
            .map(|m| ModelHealth {
                name: m.meta.name.clone(),
                kind: m.meta.kind,
                loaded: m.is_loaded(),
                reason: match &m.state {
                    ModelState::Loaded(_) => None,
                    ModelState::Unavailable(reason) => Some(reason.clone()),
                },
            })
            .collect();

        HealthStatus {
            healthy: models.iter().all(|m| m.loaded),
            models,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
