//! Command implementations for the PhishNot CLI.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use log::{debug, info};

use crate::artifact::{ArtifactConfig, inspect, load_pair};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::PhishConfig;
use crate::corpus::load_csv;
use crate::error::{PhishError, Result};
use crate::pipeline::{ServingPipeline, TrainingPipeline};

/// Execute a CLI command.
pub fn execute_command(args: PhishnotArgs) -> Result<()> {
    let config = load_config(&args)?;
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), config, &args),
        Command::Classify(classify_args) => classify(classify_args.clone(), config, &args),
        Command::Check(check_args) => check(check_args.clone(), config, &args),
        Command::Evaluate(evaluate_args) => evaluate(evaluate_args.clone(), config, &args),
    }
}

/// Defaults, or the file given with `--config`.
fn load_config(args: &PhishnotArgs) -> Result<PhishConfig> {
    match &args.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            PhishConfig::from_file(path)
        }
        None => Ok(PhishConfig::default()),
    }
}

fn artifact_config(config: &PhishConfig, dir: Option<PathBuf>) -> ArtifactConfig {
    let mut artifacts = config.artifacts.clone();
    if let Some(dir) = dir {
        artifacts.directory = dir;
    }
    artifacts
}

/// Train a model and persist the artifact pair.
fn train(args: TrainArgs, mut config: PhishConfig, cli_args: &PhishnotArgs) -> Result<()> {
    config.artifacts = artifact_config(&config, args.output_dir);
    let pipeline = TrainingPipeline::new(config)?;

    info!(
        "Writing artifacts to {}",
        pipeline.config().artifacts.directory.display()
    );

    let report = pipeline.run_from_source(args.dataset.as_deref())?;
    output_result("Training completed", &report, cli_args)
}

/// Classify one email with the persisted artifact pair.
fn classify(args: ClassifyArgs, config: PhishConfig, cli_args: &PhishnotArgs) -> Result<()> {
    let text = match (args.text, &args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let pipeline = ServingPipeline::start(artifact_config(&config, args.artifact_dir));
    if !pipeline.is_ready() {
        let reason = pipeline
            .status()
            .error
            .unwrap_or_else(|| "no artifacts loaded".to_string());
        return Err(PhishError::model_unavailable(reason));
    }

    let prediction = pipeline.classify(&text)?;
    let result = ClassificationOutput {
        phishing: prediction.is_phishing(),
        label: prediction.label.to_string(),
        confidence: prediction.confidence,
        phishing_probability: prediction.phishing_probability,
        fingerprint: pipeline.status().fingerprint,
    };
    output_result("Classification result", &result, cli_args)
}

/// Report on the artifact files. Fails when they cannot be served.
fn check(args: CheckArgs, config: PhishConfig, cli_args: &PhishnotArgs) -> Result<()> {
    let artifacts = artifact_config(&config, args.artifact_dir);
    let inspection = inspect(&artifacts);
    output_result("Artifact check", &inspection, cli_args)?;

    if inspection.is_ok() {
        return Ok(());
    }
    for report in [&inspection.vectorizer, &inspection.model] {
        if !report.exists {
            return Err(PhishError::artifact_missing(&report.path));
        }
        if let Some(reason) = &report.error {
            return Err(PhishError::artifact_corrupt(&report.path, reason.clone()));
        }
    }
    Err(PhishError::artifact_mismatch(format!(
        "artifacts in {} come from different training runs",
        artifacts.directory.display()
    )))
}

/// Score the persisted artifact pair against a labeled dataset.
fn evaluate(args: EvaluateArgs, config: PhishConfig, cli_args: &PhishnotArgs) -> Result<()> {
    let pair = load_pair(&artifact_config(&config, args.artifact_dir))?;
    let corpus = load_csv(&args.dataset, &config.columns)?;
    if corpus.is_empty() {
        return Err(PhishError::insufficient_data(format!(
            "{} contains no usable rows",
            args.dataset.display()
        )));
    }

    let features = pair.vectorizer().transform_batch(&corpus.texts())?;
    let predicted = features
        .iter()
        .map(|v| pair.classifier().predict(v).map(|p| p.label))
        .collect::<Result<Vec<_>>>()?;
    let evaluation = crate::ml::evaluate(&corpus.labels(), &predicted)?;

    let result = EvaluationOutput {
        dataset: args.dataset.display().to_string(),
        fingerprint: pair.fingerprint(),
        documents: corpus.len(),
        evaluation,
    };
    output_result("Evaluation results", &result, cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> PhishnotArgs {
        PhishnotArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_train_then_check_and_classify() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().to_str().unwrap();

        execute_command(parse(&["phishnot", "-q", "train", "--output-dir", out])).unwrap();
        assert!(dir.path().join("phish_model.bin").is_file());
        assert!(dir.path().join("vectorizer.bin").is_file());

        execute_command(parse(&["phishnot", "-q", "check", "--artifact-dir", out])).unwrap();
        execute_command(parse(&[
            "phishnot",
            "-q",
            "--format",
            "json",
            "classify",
            "Urgent: verify your account password now",
            "--artifact-dir",
            out,
        ]))
        .unwrap();
    }

    #[test]
    fn test_check_fails_without_artifacts() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().to_str().unwrap();
        let err = execute_command(parse(&["phishnot", "-q", "check", "-a", out])).unwrap_err();
        assert!(matches!(err, PhishError::ArtifactMissing { .. }));
    }

    #[test]
    fn test_classify_without_artifacts_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().to_str().unwrap();
        let err = execute_command(parse(&["phishnot", "-q", "classify", "hello there", "-a", out]))
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_missing_config_file() {
        let args = parse(&["phishnot", "--config", "/nonexistent/phishnot.json", "check"]);
        assert!(matches!(
            execute_command(args),
            Err(PhishError::Config(_))
        ));
    }
}
