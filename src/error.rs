//! Error types for PhishNot.
//!
//! All fallible operations in the library return [`PhishError`] through the
//! [`Result`] alias. The variants follow the lifecycle of the system:
//! artifact loading, fitting, and per-request classification.
//!
//! # Examples
//!
//! ```
//! use phishnot::error::{PhishError, Result};
//!
//! fn reject(text: &str) -> Result<()> {
//!     if text.trim().is_empty() {
//!         return Err(PhishError::invalid_input("email text cannot be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(reject("   ").is_err());
//! ```

use std::io;
use std::path::Path;

use thiserror::Error;

/// The main error type for PhishNot operations.
#[derive(Error, Debug)]
pub enum PhishError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// One or both artifact files are absent.
    #[error("Artifact missing: {path}")]
    ArtifactMissing { path: String },

    /// An artifact file exists but cannot be decoded.
    #[error("Artifact corrupt: {path}: {reason}")]
    ArtifactCorrupt { path: String, reason: String },

    /// The vectorizer and classifier do not originate from the same training run.
    #[error("Artifact mismatch: {0}")]
    ArtifactMismatch(String),

    /// Transform called before fit, or fitting pruned every token.
    #[error("Empty vocabulary: {0}")]
    EmptyVocabulary(String),

    /// Training data lacks one of the two classes.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Request text rejected before reaching the model.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serving pipeline has no artifacts loaded.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Training corpus problems (columns, labels).
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Invalid configuration values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// CSV reader errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with PhishError.
pub type Result<T> = std::result::Result<T, PhishError>;

impl PhishError {
    /// Create a new artifact missing error.
    pub fn artifact_missing<P: AsRef<Path>>(path: P) -> Self {
        PhishError::ArtifactMissing {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Create a new artifact corrupt error.
    pub fn artifact_corrupt<P: AsRef<Path>, S: Into<String>>(path: P, reason: S) -> Self {
        PhishError::ArtifactCorrupt {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Create a new artifact mismatch error.
    pub fn artifact_mismatch<S: Into<String>>(msg: S) -> Self {
        PhishError::ArtifactMismatch(msg.into())
    }

    /// Create a new empty vocabulary error.
    pub fn empty_vocabulary<S: Into<String>>(msg: S) -> Self {
        PhishError::EmptyVocabulary(msg.into())
    }

    /// Create a new insufficient data error.
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        PhishError::InsufficientData(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        PhishError::InvalidInput(msg.into())
    }

    /// Create a new model unavailable error.
    pub fn model_unavailable<S: Into<String>>(msg: S) -> Self {
        PhishError::ModelUnavailable(msg.into())
    }

    /// Create a new corpus error.
    pub fn corpus<S: Into<String>>(msg: S) -> Self {
        PhishError::Corpus(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PhishError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PhishError::Other(msg.into())
    }

    /// Whether this error describes a per-request rejection rather than a
    /// service-level condition.
    pub fn is_request_error(&self) -> bool {
        matches!(self, PhishError::InvalidInput(_))
    }

    /// Whether this error signals that the service is degraded.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            PhishError::ModelUnavailable(_) | PhishError::ArtifactMissing { .. }
        )
    }
}
