//! Command line argument parsing for the PhishNot CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// PhishNot - phishing email detection with TF-IDF and logistic regression
#[derive(Parser, Debug, Clone)]
#[command(name = "phishnot")]
#[command(about = "Train and run a phishing email classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PhishnotArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "PHISHNOT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PhishnotArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model and write the artifact pair
    Train(TrainArgs),

    /// Classify an email
    Classify(ClassifyArgs),

    /// Check that the artifact files are present and readable
    Check(CheckArgs),

    /// Score persisted artifacts against a labeled dataset
    Evaluate(EvaluateArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Labeled CSV dataset (the built-in sample corpus is used when omitted)
    #[arg(value_name = "DATASET")]
    pub dataset: Option<PathBuf>,

    /// Directory to write the artifact pair to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Email text (read from --file or stdin when omitted)
    #[arg(value_name = "TEXT", conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the email text from a file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Directory holding the artifact pair
    #[arg(short, long, value_name = "DIR")]
    pub artifact_dir: Option<PathBuf>,
}

/// Arguments for the artifact check
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Directory holding the artifact pair
    #[arg(short, long, value_name = "DIR")]
    pub artifact_dir: Option<PathBuf>,
}

/// Arguments for evaluation
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Labeled CSV dataset
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Directory holding the artifact pair
    #[arg(short, long, value_name = "DIR")]
    pub artifact_dir: Option<PathBuf>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
