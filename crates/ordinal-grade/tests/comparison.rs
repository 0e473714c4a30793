//! Side-by-side grading through the service and the comparator.

use std::sync::Arc;

use ndarray::Array3;
use rstest::{fixture, rstest};
use serde_json::json;

use ordinal_grade::compare::{Comparator, HigherConfidence};
use ordinal_grade::inference::{GradingService, PredictionResult};
use ordinal_grade::model::{GradingConfig, ModelMeta};
use ordinal_grade::testing::{FailingBackbone, FixedBackbone};
use ordinal_grade::{ErrorKind, GradeError, SeverityTaxonomy};

fn result(grade: usize, confidence: f32) -> PredictionResult {
    let mut distribution = vec![(1.0 - confidence) / 4.0; 5];
    distribution[grade] = confidence;
    PredictionResult::new(grade, confidence, distribution, vec![])
}

#[rstest]
#[case::agree(result(2, 0.80), result(2, 0.70), true, 0, HigherConfidence::A)]
#[case::disagree_tie(result(1, 0.60), result(3, 0.60), false, 2, HigherConfidence::Tie)]
#[case::b_higher(result(0, 0.40), result(4, 0.90), false, 4, HigherConfidence::B)]
fn comparator_fixtures(
    #[case] a: PredictionResult,
    #[case] b: PredictionResult,
    #[case] grades_match: bool,
    #[case] grade_difference: usize,
    #[case] higher: HigherConfidence,
) {
    let taxonomy = SeverityTaxonomy::kellgren_lawrence();
    let comparison = Comparator::new(&taxonomy).compare(&a, &b);
    assert_eq!(comparison.grades_match, grades_match);
    assert_eq!(comparison.grade_difference, grade_difference);
    assert_eq!(comparison.higher_confidence, higher);
    assert!(!comparison.analysis.is_empty());
}

#[fixture]
fn service() -> GradingService {
    let mut service = GradingService::new(GradingConfig::default()).unwrap();
    service
        .register(
            ModelMeta::ordinal("coral")
                .with_model_type("CORAL Ordinal Regression (EfficientNet-B0)")
                .with_description("EfficientNet-B0 backbone with a CORAL head."),
            Arc::new(FixedBackbone::new(vec![0.95, 0.85, 0.2, 0.05])),
        )
        .unwrap();
    service
        .register(
            ModelMeta::categorical("resnet50").with_model_type("ResNet50 Classification"),
            Arc::new(FixedBackbone::new(vec![0.05, 0.15, 0.2, 0.5, 0.1])),
        )
        .unwrap();
    service
        .register(
            ModelMeta::categorical("broken"),
            Arc::new(FailingBackbone::new("weights file missing")),
        )
        .unwrap();
    service
}

fn image() -> Array3<f32> {
    Array3::from_elem((3, 16, 16), 0.5)
}

#[rstest]
fn disagreement_recommends_ordinal_model(service: GradingService) {
    let report = service.compare("coral", "resnet50", image().view());
    let comparison = report.comparison.expect("both sides succeeded");

    assert!(!comparison.grades_match);
    assert_eq!(comparison.grade_difference, 1);
    // 0.85 - 0.2 vs 0.5
    assert_eq!(comparison.higher_confidence, HigherConfidence::A);
    assert!(comparison.analysis.contains("Grade 2 (Mild)"));
    assert!(comparison.analysis.contains("Grade 3 (Moderate)"));
    assert!(comparison
        .analysis
        .contains("CORAL Ordinal Regression (EfficientNet-B0) is ordinal-aware"));
}

#[rstest]
fn failing_side_keeps_other_result(service: GradingService) {
    let report = service.compare("broken", "coral", image().view());

    assert!(report.comparison.is_none());
    let failure = report.a.error().expect("side A failed");
    assert_eq!(failure.kind, ErrorKind::Upstream);
    assert!(failure.error.contains("weights file missing"));

    let coral = report.b.report().expect("side B succeeded");
    assert_eq!(coral.prediction.grade(), 2);
    assert_eq!(coral.severity, "Mild");
}

#[rstest]
fn unknown_model_is_reported_not_raised(service: GradingService) {
    let report = service.compare("coral", "densenet", image().view());
    assert!(report.comparison.is_none());
    assert!(report.a.report().is_some());
    assert_eq!(report.b.error().map(|e| e.kind), Some(ErrorKind::Upstream));
}

#[rstest]
fn dual_report_json_shape(service: GradingService) {
    let report = service.compare("coral", "broken", image().view());
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["a"]["model"], json!("coral"));
    assert_eq!(value["a"]["severity"], json!("Mild"));
    assert_eq!(
        value["a"]["model_description"],
        json!("EfficientNet-B0 backbone with a CORAL head.")
    );
    assert_eq!(value["b"]["kind"], json!("upstream"));
    assert!(value["comparison"].is_null());

    let report = service.compare("coral", "resnet50", image().view());
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["comparison"]["higher_confidence"], json!("A"));
    assert_eq!(value["comparison"]["grades_match"], json!(false));
}

#[rstest]
fn grade_errors_propagate(service: GradingService) {
    let err = service.grade("broken", image().view()).unwrap_err();
    assert!(matches!(err, GradeError::UpstreamUnavailable { ref model, .. } if model == "broken"));
}

#[rstest]
fn health_flags_each_model(service: GradingService) {
    let health = service.health();
    assert!(health.healthy);
    let names: Vec<_> = health.models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["coral", "resnet50", "broken"]);
}
