//! Model descriptions and grading configuration.
//!
//! - [`GradingConfig`]: validated configuration (classes, taxonomy, correction)
//! - [`ModelMeta`] / [`ModelKind`]: what a registered backbone outputs
//! - [`ScoreTransform`]: squashing applied to raw backbone output

mod config;
mod meta;
mod transform;

pub use config::{ConfigError, GradingConfig, GradingConfigBuilder};
pub use meta::{ModelKind, ModelMeta};
pub use transform::ScoreTransform;
