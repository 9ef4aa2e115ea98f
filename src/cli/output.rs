//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::{ArtifactFileReport, ArtifactInspection};
use crate::cli::args::{OutputFormat, PhishnotArgs};
use crate::error::Result;
use crate::ml::{ConfusionMatrix, Evaluation};
use crate::pipeline::TrainingReport;

/// Result structure for a classified email.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassificationOutput {
    pub phishing: bool,
    pub label: String,
    pub confidence: f64,
    pub phishing_probability: f64,
    pub fingerprint: Option<Uuid>,
}

/// Result structure for evaluating persisted artifacts.
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationOutput {
    pub dataset: String,
    pub fingerprint: Uuid,
    pub documents: usize,
    pub evaluation: Evaluation,
}

/// A command result that can be printed for humans.
///
/// JSON output goes through `Serialize`; the human form defaults to one
/// `key: value` line per top-level field.
pub trait CliOutput: Serialize {
    fn print_human(&self) -> Result<()> {
        output_generic_human(&serde_json::to_value(self)?);
        Ok(())
    }
}

/// Output a result in the specified format.
pub fn output_result<T: CliOutput>(message: &str, result: &T, args: &PhishnotArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            result.print_human()
        }
        OutputFormat::Json => output_json(result, args),
    }
}

impl CliOutput for ClassificationOutput {
    fn print_human(&self) -> Result<()> {
        let verdict = if self.phishing { "PHISHING" } else { "SAFE" };
        println!("Verdict:    {verdict}");
        println!("Confidence: {:.2}%", self.confidence * 100.0);
        println!("P(phishing): {:.4}", self.phishing_probability);
        Ok(())
    }
}

impl CliOutput for TrainingReport {
    fn print_human(&self) -> Result<()> {
        let m = &self.metrics;
        println!("Model Evaluation");
        println!("════════════════");
        println!("Training set:      {} emails", self.train_size);
        println!("Test set:          {} emails", self.test_size);
        println!("Vocabulary:        {} terms", self.vocabulary_size);
        println!();
        println!("Training Accuracy: {}", percent(m.train_accuracy));
        println!("Test Accuracy:     {}", percent(m.test_accuracy));
        println!("Test Precision:    {}", percent(m.precision));
        println!("Test Recall:       {}", percent(m.recall));
        println!("Test F1-Score:     {}", percent(m.f1));
        println!();
        println!("Classification Report:");
        println!("{}", self.classification_report);
        println!("Confusion Matrix:");
        print_confusion_matrix(&self.confusion_matrix);
        println!();
        if let Some(warning) = &self.training.warning {
            println!("Warning: {warning}");
        }
        println!("Fingerprint: {}", self.fingerprint);
        if let Some(paths) = &self.artifacts {
            println!("Model saved to:      {}", paths.model.display());
            println!("Vectorizer saved to: {}", paths.vectorizer.display());
        }
        Ok(())
    }
}

impl CliOutput for EvaluationOutput {
    fn print_human(&self) -> Result<()> {
        let m = &self.evaluation.metrics;
        println!("Dataset:     {} ({} emails)", self.dataset, self.documents);
        println!("Fingerprint: {}", self.fingerprint);
        println!();
        println!("Accuracy:  {}", percent(m.accuracy));
        println!("Precision: {}", percent(m.precision));
        println!("Recall:    {}", percent(m.recall));
        println!("F1-Score:  {}", percent(m.f1));
        println!();
        println!("{}", self.evaluation.report);
        println!("Confusion Matrix:");
        print_confusion_matrix(&self.evaluation.confusion_matrix);
        Ok(())
    }
}

impl CliOutput for ArtifactInspection {
    fn print_human(&self) -> Result<()> {
        println!("Artifact directory: {}", self.directory.display());
        println!();
        for report in [&self.model, &self.vectorizer] {
            print_file_report(report);
        }
        if self.vectorizer.is_ok() && self.model.is_ok() {
            if self.consistent {
                println!("[OK] Both artifacts come from the same training run");
            } else {
                println!("[ERROR] Artifacts come from different training runs");
            }
        }
        Ok(())
    }
}

fn print_file_report(report: &ArtifactFileReport) {
    let status = if report.is_ok() { "[OK]" } else { "[ERROR]" };
    println!("{status} {} ({})", report.path.display(), report.kind);
    if let Some(size) = report.size_bytes {
        println!("    size:        {}", format_bytes(size));
    }
    if let Some(header) = &report.header {
        println!("    version:     {}", header.version);
    }
    if let Some(metadata) = &report.metadata {
        println!("    fingerprint: {}", metadata.fingerprint);
        println!("    created:     {}", metadata.created_at.to_rfc3339());
        println!("    features:    {}", metadata.n_features);
    }
    if let Some(error) = &report.error {
        println!("    error:       {error}");
    }
}

fn print_confusion_matrix(matrix: &ConfusionMatrix) {
    println!("{:>14} {:>10} {:>10}", "", "pred safe", "pred phish");
    for (name, row) in ["safe", "phishing"].iter().zip(matrix.counts) {
        println!("{:>14} {:>10} {:>10}", name, row[0], row[1]);
    }
}

fn output_generic_human(value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(value);
            println!("{formatted_value}");
        }
    }
}

fn output_json<T: Serialize>(result: &T, args: &PhishnotArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}

fn percent(ratio: f64) -> String {
    format!("{ratio:.4} ({:.2}%)", ratio * 100.0)
}

/// Format bytes into human-readable format.
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{bytes} B")
    } else {
        let unit = UNITS[unit_index];
        format!("{size:.1} {unit}")
    }
}
