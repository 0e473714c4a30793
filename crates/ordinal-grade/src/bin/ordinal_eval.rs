//! Evaluate raw ordinal scores against true grades.
//!
//! Reads a JSON file of per-threshold scores (one row per sample, optionally
//! with true labels), decodes every row, prints metrics plus per-threshold
//! `P(grade > i)` lines for the first few samples, and optionally writes the
//! evaluation report and per-sample predictions as JSON.
//!
//! Input format:
//!
//! ```json
//! { "scores": [[0.9, 0.8, 0.3, 0.1], [0.2, 0.1, 0.0, 0.0]], "labels": [2, 0] }
//! ```
//!
//! Usage:
//!   cargo run --bin ordinal-eval -- scores.json --report report.json --show 5

#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use ordinal_grade::inference::{DistributionCorrection, Grade, OrdinalDecoder, PredictionResult};
use ordinal_grade::model::{GradingConfig, ScoreTransform};
use ordinal_grade::training::Evaluator;
use ordinal_grade::{run_with_threads, GradeError, Result};

#[derive(Parser)]
#[command(name = "ordinal-eval", version, about = "Decode and evaluate ordinal threshold scores")]
struct Cli {
    /// JSON file with `scores` and optional `labels`
    input: PathBuf,

    /// Grading configuration (JSON); defaults to five Kellgren–Lawrence grades
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clamp negative telescoped probabilities and renormalize
    #[arg(long)]
    clamp: bool,

    /// Squashing applied to the scores before decoding
    #[arg(long, value_enum, default_value_t = Transform::Identity)]
    transform: Transform,

    /// Decoding threads (0 = all cores, 1 = sequential); overrides the config
    #[arg(long)]
    threads: Option<usize>,

    /// Number of samples to print per-threshold probabilities for
    #[arg(long, default_value_t = 3)]
    show: usize,

    /// Write the evaluation report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write per-sample predictions as JSON
    #[arg(long)]
    predictions: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Transform {
    /// Scores are already probabilities
    Identity,
    /// Scores are logits
    Sigmoid,
}

impl From<Transform> for ScoreTransform {
    fn from(t: Transform) -> Self {
        match t {
            Transform::Identity => ScoreTransform::Identity,
            Transform::Sigmoid => ScoreTransform::Sigmoid,
        }
    }
}

#[derive(Deserialize)]
struct ScoreFile {
    scores: Vec<Vec<f32>>,
    #[serde(default)]
    labels: Option<Vec<Grade>>,
}

#[derive(Serialize)]
struct PredictionRecord<'a> {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    true_label: Option<Grade>,
    predicted_label: Grade,
    severity: &'a str,
    confidence_percent: f64,
    distribution: &'a [f32],
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(kind = ?err.kind(), "{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => GradingConfig::from_json_file(path)?,
        None => GradingConfig::default(),
    };
    if cli.clamp {
        config.correction = DistributionCorrection::ClampAndRenormalize;
    }
    if let Some(threads) = cli.threads {
        config.n_threads = threads;
    }

    let input: ScoreFile = serde_json::from_str(&fs::read_to_string(&cli.input)?)?;
    let mut scores = to_matrix(input.scores, config.n_thresholds())?;
    let transform = ScoreTransform::from(cli.transform);
    for mut row in scores.rows_mut() {
        if let Some(row) = row.as_slice_mut() {
            transform.apply_inplace(row);
        }
    }
    tracing::info!(samples = scores.nrows(), thresholds = scores.ncols(), "loaded scores");

    let decoder = OrdinalDecoder::from(&config);
    let predictions = run_with_threads(config.n_threads, |parallelism| {
        decoder.decode_batch(scores.view(), parallelism)
    })?;

    print_samples(&predictions, input.labels.as_deref(), &config, cli.show);

    if let Some(labels) = input.labels.as_deref() {
        let report = Evaluator::new(config.num_classes).evaluate_predictions(&predictions, labels)?;

        println!("\n===== Evaluation Results =====");
        for metric in &report.metrics {
            println!("{metric}");
        }
        println!("\nConfusion matrix:\n{}", report.confusion_matrix);

        if let Some(path) = &cli.report {
            write_json(path, &report)?;
        }
    } else if cli.report.is_some() {
        tracing::warn!("input has no labels, skipping evaluation report");
    }

    if let Some(path) = &cli.predictions {
        let labels = input.labels.as_deref();
        let records: Vec<PredictionRecord<'_>> = predictions
            .iter()
            .enumerate()
            .map(|(index, p)| PredictionRecord {
                index,
                true_label: labels.and_then(|l| l.get(index).copied()),
                predicted_label: p.grade(),
                severity: &config.taxonomy.lookup(p.grade()).severity,
                confidence_percent: p.confidence_percent(),
                distribution: p.distribution(),
            })
            .collect();
        write_json(path, &records)?;
    }

    Ok(())
}

fn to_matrix(rows: Vec<Vec<f32>>, n_thresholds: usize) -> Result<Array2<f32>> {
    if let Some(bad) = rows.iter().find(|r| r.len() != n_thresholds) {
        return Err(GradeError::Shape {
            expected: n_thresholds,
            got: bad.len(),
        });
    }
    Ok(Array2::from_shape_fn((rows.len(), n_thresholds), |(r, c)| rows[r][c]))
}

fn print_samples(
    predictions: &[PredictionResult],
    labels: Option<&[Grade]>,
    config: &GradingConfig,
    show: usize,
) {
    for (i, prediction) in predictions.iter().take(show).enumerate() {
        let info = config.taxonomy.lookup(prediction.grade());
        match labels.and_then(|l| l.get(i)) {
            Some(label) => println!(
                "Sample {i}: true {label}, predicted {} ({}), confidence {:.2}%",
                prediction.grade(),
                info.severity,
                prediction.confidence_percent()
            ),
            None => println!(
                "Sample {i}: predicted {} ({}), confidence {:.2}%",
                prediction.grade(),
                info.severity,
                prediction.confidence_percent()
            ),
        }
        for (t, score) in prediction.raw_scores().iter().enumerate() {
            println!("  P(grade > {t}) = {score:.4}");
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    tracing::info!(path = %path.display(), "wrote JSON output");
    Ok(())
}
