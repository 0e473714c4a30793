//! Training-time building blocks.
//!
//! This crate doesn't own a training loop. It supplies what one consumes:
//!
//! - [`encode_ordinal_label`] / [`encode_ordinal_batch`]: grade → threshold indicators
//! - [`OrdinalLoss`]: CORAL loss with gradients for an external optimizer
//! - [`Evaluator`] and [`Metric`]: accuracy, QWK, MAE and macro F1 over grades

mod encoding;
mod eval;
mod gradients;
pub mod metrics;
pub mod objectives;

pub use encoding::{encode_ordinal_batch, encode_ordinal_label};
pub use eval::{EvaluationReport, Evaluator, MetricValue};
pub use gradients::GradsTuple;
pub use metrics::{
    Accuracy, ConfusionMatrix, MacroF1, MeanAbsoluteError, Metric, MetricFn, QuadraticWeightedKappa,
};
pub use objectives::{ordinal_loss, ObjectiveFn, OrdinalLoss};
