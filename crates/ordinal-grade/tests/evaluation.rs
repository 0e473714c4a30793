//! Training-side pipeline: encode, score, decode in batch, evaluate.

use std::fs;
use std::process::Command;

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};
use rand::prelude::*;

use ordinal_grade::inference::OrdinalDecoder;
use ordinal_grade::model::GradingConfig;
use ordinal_grade::training::{
    encode_ordinal_batch, ordinal_loss, Evaluator, GradsTuple, ObjectiveFn, OrdinalLoss,
};
use ordinal_grade::{run_with_threads, Parallelism};

/// Noisy but mostly rank-consistent scores around each label's encoding.
fn synthetic_scores(labels: &[usize], num_classes: usize, seed: u64) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let encoded = encode_ordinal_batch(labels, num_classes).unwrap();
    encoded.mapv(|bit| {
        let noise = rng.gen::<f32>() * 0.3;
        if bit > 0.5 { 0.95 - noise } else { 0.05 + noise }
    })
}

#[test]
fn loss_falls_as_predictions_approach_labels() {
    let labels = [0, 1, 2, 3, 4];
    let target = encode_ordinal_batch(&labels, 5).unwrap();
    let uniform = Array2::from_elem((5, 4), 0.5f32);
    let sharp = target.mapv(|bit| if bit > 0.5 { 0.99 } else { 0.01 });

    let at_uniform = ordinal_loss(uniform.view(), &labels, 5).unwrap();
    let at_sharp = ordinal_loss(sharp.view(), &labels, 5).unwrap();
    assert_abs_diff_eq!(at_uniform, std::f64::consts::LN_2, epsilon = 1e-6);
    assert!(at_sharp < 0.02);
}

#[test]
fn gradient_step_reduces_loss() {
    let labels = [1, 3];
    let logits = array![[0.0f32, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0]];
    let sigmoid = |z: f32| 1.0 / (1.0 + (-z).exp());
    let objective = OrdinalLoss::new(5);

    let preds = logits.mapv(sigmoid);
    let before = objective.loss(preds.view(), &labels).unwrap();

    let mut grad_hess = Array2::<GradsTuple>::default(preds.dim());
    objective
        .compute_gradients_into(preds.view(), &labels, grad_hess.view_mut())
        .unwrap();

    // One Newton step per logit
    let stepped = ndarray::Zip::from(&logits)
        .and(&grad_hess)
        .map_collect(|&z, gh| z - gh.grad / gh.hess);
    let after = objective.loss(stepped.mapv(sigmoid).view(), &labels).unwrap();
    assert!(after < before, "{after} >= {before}");
}

#[test]
fn batch_decode_and_evaluate() {
    let labels: Vec<usize> = (0..200).map(|i| i % 5).collect();
    let scores = synthetic_scores(&labels, 5, 42);
    let config = GradingConfig::builder().n_threads(2).build().unwrap();
    let decoder = OrdinalDecoder::from(&config);

    let predictions = run_with_threads(config.n_threads, |parallelism| {
        decoder.decode_batch(scores.view(), parallelism)
    })
    .unwrap();
    let sequential = decoder.decode_batch(scores.view(), Parallelism::Sequential).unwrap();
    assert_eq!(predictions, sequential);

    // Noise never crosses 0.5, so every grade is recovered
    let report = Evaluator::new(5).evaluate_predictions(&predictions, &labels).unwrap();
    assert_eq!(report.n_samples, 200);
    assert_eq!(report.get("accuracy"), Some(1.0));
    assert_eq!(report.get("qwk"), Some(1.0));
    assert_eq!(report.get("mae"), Some(0.0));
    assert_eq!(report.get("macro_f1"), Some(1.0));
}

#[test]
fn report_serializes_confusion_rows() {
    let report = Evaluator::new(3).evaluate(&[0, 1, 2, 2], &[0, 1, 1, 2]).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["confusion_matrix"], serde_json::json!([[1, 0, 0], [0, 1, 1], [0, 0, 1]]));
    assert_eq!(value["metrics"][0]["name"], "accuracy");
}

#[test]
fn cli_writes_report_and_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scores.json");
    let report = dir.path().join("report.json");
    let predictions = dir.path().join("predictions.json");
    fs::write(
        &input,
        r#"{"scores": [[0.9, 0.8, 0.3, 0.1], [0.2, 0.1, 0.0, 0.0], [0.99, 0.95, 0.9, 0.7]], "labels": [2, 0, 3]}"#,
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_ordinal-eval"))
        .arg(&input)
        .arg("--report")
        .arg(&report)
        .arg("--predictions")
        .arg(&predictions)
        .arg("--threads")
        .arg("1")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("P(grade > 0) = 0.9000"));
    assert!(stdout.contains("accuracy: 0.6667"));

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["n_samples"], 3);

    let records: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&predictions).unwrap()).unwrap();
    assert_eq!(records[2]["predicted_label"], 4);
    assert_eq!(records[2]["true_label"], 3);
    assert_eq!(records[0]["severity"], "Mild");
}

#[test]
fn cli_rejects_wrong_threshold_count() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scores.json");
    fs::write(&input, r#"{"scores": [[0.9, 0.8, 0.3]]}"#).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_ordinal-eval"))
        .arg(&input)
        .output()
        .unwrap();
    assert!(!output.status.success());
}
