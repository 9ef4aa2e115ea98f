//! Persisted model artifacts.
//!
//! A trained model is a pair of files: the fitted vectorizer and the
//! fitted classifier. Both carry the same [`ArtifactMetadata`], so a
//! vectorizer is never served with a classifier from another training run.

pub mod format;
mod store;

pub use format::{ArtifactHeader, ArtifactKind};
pub use store::*;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PhishError, Result};
use crate::ml::{
    ClassifierState, LogisticRegression, Prediction, TfIdfVectorizer, VectorizerState,
};

/// Where the artifact pair lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory holding both files.
    pub directory: PathBuf,
    /// File name of the classifier artifact.
    pub model_file: String,
    /// File name of the vectorizer artifact.
    pub vectorizer_file: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./models"),
            model_file: "phish_model.bin".to_string(),
            vectorizer_file: "vectorizer.bin".to_string(),
        }
    }
}

impl ArtifactConfig {
    /// Default file names inside `directory`.
    pub fn in_dir<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.directory.join(&self.model_file)
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.directory.join(&self.vectorizer_file)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_file.is_empty() || self.vectorizer_file.is_empty() {
            return Err(PhishError::config("artifact file names must not be empty"));
        }
        if self.model_file == self.vectorizer_file {
            return Err(PhishError::config(
                "model and vectorizer artifacts need distinct file names",
            ));
        }
        Ok(())
    }
}

/// Identity shared by both halves of an artifact pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Unique per training run.
    pub fingerprint: Uuid,
    pub created_at: DateTime<Utc>,
    /// Vocabulary size, equal to the classifier's weight count.
    pub n_features: usize,
}

impl ArtifactMetadata {
    /// Fresh metadata for a newly trained pair.
    pub fn generate(n_features: usize) -> Self {
        Self {
            fingerprint: Uuid::new_v4(),
            created_at: Utc::now(),
            n_features,
        }
    }
}

/// Payload of the vectorizer file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct VectorizerArtifact {
    pub metadata: ArtifactMetadata,
    pub state: VectorizerState,
}

/// Payload of the classifier file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ClassifierArtifact {
    pub metadata: ArtifactMetadata,
    pub state: ClassifierState,
}

/// A fitted vectorizer and classifier from the same training run.
///
/// Immutable once built; serving shares it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ArtifactPair {
    metadata: ArtifactMetadata,
    vectorizer: TfIdfVectorizer,
    classifier: LogisticRegression,
}

impl ArtifactPair {
    /// Pair freshly trained components under a new fingerprint.
    pub fn new(vectorizer: TfIdfVectorizer, classifier: LogisticRegression) -> Result<Self> {
        let metadata = ArtifactMetadata::generate(vectorizer.vocabulary_size());
        Self::with_metadata(metadata, vectorizer, classifier)
    }

    /// Pair components under existing metadata, checking that they agree.
    pub fn with_metadata(
        metadata: ArtifactMetadata,
        vectorizer: TfIdfVectorizer,
        classifier: LogisticRegression,
    ) -> Result<Self> {
        if !vectorizer.is_fitted() || !classifier.is_trained() {
            return Err(PhishError::other(
                "artifact pair requires a fitted vectorizer and a trained classifier",
            ));
        }
        if vectorizer.vocabulary_size() != classifier.n_features()
            || metadata.n_features != classifier.n_features()
        {
            return Err(PhishError::artifact_mismatch(format!(
                "vocabulary has {} terms but the classifier expects {} features",
                vectorizer.vocabulary_size(),
                classifier.n_features()
            )));
        }
        Ok(Self {
            metadata,
            vectorizer,
            classifier,
        })
    }

    /// Vectorize `text` and score it.
    pub fn classify(&self, text: &str) -> Result<Prediction> {
        let features = self.vectorizer.transform(text)?;
        self.classifier.predict(&features)
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn fingerprint(&self) -> Uuid {
        self.metadata.fingerprint
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    pub(crate) fn to_artifacts(&self) -> Result<(VectorizerArtifact, ClassifierArtifact)> {
        Ok((
            VectorizerArtifact {
                metadata: self.metadata,
                state: self.vectorizer.to_state(),
            },
            ClassifierArtifact {
                metadata: self.metadata,
                state: self.classifier.to_state()?,
            },
        ))
    }
}
