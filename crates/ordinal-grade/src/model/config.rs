//! Grading configuration with builder pattern.
//!
//! [`GradingConfig`] holds everything the decoding pipeline needs besides the
//! backbones themselves. It uses the `bon` crate for builder generation and is
//! validated when built or loaded from disk.
//!
//! # Example
//!
//! ```
//! use ordinal_grade::model::GradingConfig;
//! use ordinal_grade::inference::DistributionCorrection;
//!
//! // All defaults: five Kellgren–Lawrence grades, raw distributions
//! let config = GradingConfig::builder().build().unwrap();
//! assert_eq!(config.num_classes, 5);
//!
//! let config = GradingConfig::builder()
//!     .correction(DistributionCorrection::ClampAndRenormalize)
//!     .n_threads(1)
//!     .build()
//!     .unwrap();
//! ```

use std::fs;
use std::path::Path;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::GradeError;
use crate::inference::DistributionCorrection;
use crate::taxonomy::{SeverityTaxonomy, TaxonomyError};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Ordinal grading needs at least two classes (one threshold).
    #[error("num_classes must be at least 2, got {0}")]
    TooFewClasses(usize),

    /// Taxonomy is malformed or doesn't cover every grade.
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),

    /// A model name was registered twice.
    #[error("model '{0}' is registered more than once")]
    DuplicateModel(String),
}

// =============================================================================
// GradingConfig
// =============================================================================

/// Configuration shared by every grading call.
///
/// # Structure
///
/// - **Grades**: `num_classes` and the [`SeverityTaxonomy`] describing them
/// - **Decoding**: [`DistributionCorrection`] for ill-behaved raw scores
/// - **Resources**: thread count for batch decoding
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
#[serde(default)]
pub struct GradingConfig {
    /// Number of ordered grades. Default: 5.
    #[builder(default = 5)]
    pub num_classes: usize,

    /// How to treat negative telescoped probabilities. Default: `NoClamp`.
    #[builder(default)]
    pub correction: DistributionCorrection,

    /// Display text per grade. Default: Kellgren–Lawrence.
    #[builder(default)]
    pub taxonomy: SeverityTaxonomy,

    /// Threads for batch decoding. `0` = all cores, `1` = sequential.
    #[builder(default)]
    pub n_threads: usize,
}

/// Custom finishing function that validates the config.
impl<S: grading_config_builder::IsComplete> GradingConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - `num_classes < 2`
    /// - the taxonomy doesn't have exactly `num_classes` entries
    pub fn build(self) -> Result<GradingConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl GradingConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_classes < 2 {
            return Err(ConfigError::TooFewClasses(self.num_classes));
        }
        self.taxonomy.validate_for(self.num_classes)?;
        Ok(())
    }

    /// Number of ordinal thresholds (`num_classes - 1`).
    pub fn n_thresholds(&self) -> usize {
        self.num_classes.saturating_sub(1)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// Missing fields take their defaults, so `{}` is a valid file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GradeError> {
        let text = fs::read_to_string(path)?;
        let config: GradingConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            num_classes: 5,
            correction: DistributionCorrection::default(),
            taxonomy: SeverityTaxonomy::default(),
            n_threads: 0,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::SeverityInfo;

    #[test]
    fn default_config_is_valid() {
        let config = GradingConfig::builder().build().unwrap();
        assert_eq!(config.num_classes, 5);
        assert_eq!(config.n_thresholds(), 4);
        assert_eq!(config.correction, DistributionCorrection::NoClamp);
        assert_eq!(config.n_threads, 0);
        assert!(GradingConfig::default().validate().is_ok());
    }

    #[test]
    fn too_few_classes() {
        let taxonomy = SeverityTaxonomy::new(vec![SeverityInfo::new("Only", "One grade.")]).unwrap();
        let result = GradingConfig::builder()
            .num_classes(1)
            .taxonomy(taxonomy)
            .build();
        assert!(matches!(result, Err(ConfigError::TooFewClasses(1))));
    }

    #[test]
    fn taxonomy_must_cover_every_grade() {
        let result = GradingConfig::builder().num_classes(3).build();
        assert!(matches!(
            result,
            Err(ConfigError::Taxonomy(TaxonomyError::LengthMismatch { expected: 3, got: 5 }))
        ));
    }

    #[test]
    fn custom_taxonomy() {
        let taxonomy = SeverityTaxonomy::new(vec![
            SeverityInfo::new("Low", "Low severity."),
            SeverityInfo::new("Medium", "Medium severity."),
            SeverityInfo::new("High", "High severity."),
        ])
        .unwrap();
        let config = GradingConfig::builder()
            .num_classes(3)
            .taxonomy(taxonomy)
            .build()
            .unwrap();
        assert_eq!(config.taxonomy.lookup(2).severity, "High");
    }

    #[test]
    fn load_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grading.json");
        fs::write(&path, r#"{"correction": "clamp_and_renormalize", "n_threads": 2}"#).unwrap();

        let config = GradingConfig::from_json_file(&path).unwrap();
        assert_eq!(config.num_classes, 5);
        assert_eq!(config.correction, DistributionCorrection::ClampAndRenormalize);
        assert_eq!(config.n_threads, 2);
    }

    #[test]
    fn load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grading.json");
        fs::write(&path, r#"{"num_classes": 4}"#).unwrap();

        let err = GradingConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, GradeError::Config(ConfigError::Taxonomy(_))));

        let missing = GradingConfig::from_json_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, GradeError::Io(_)));
    }
}
