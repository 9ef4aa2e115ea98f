//! Serving pipeline.
//!
//! Holds one [`ArtifactPair`] behind an `Arc`. Requests clone the `Arc`
//! under a short read lock and then run without any lock held; `reload`
//! replaces the whole pair under the write lock, so a request never sees
//! a vectorizer and classifier from different training runs.
//!
//! If the artifacts cannot be loaded the pipeline still starts, in a
//! degraded state where every request fails with `ModelUnavailable`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::{ArtifactConfig, ArtifactPair, load_pair};
use crate::error::{PhishError, Result};
use crate::ml::Prediction;

/// Body of a classification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub email: String,
}

/// Body of a classification response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    #[serde(rename = "phishing", alias = "isPhishing")]
    pub is_phishing: bool,
    /// Probability of the predicted class.
    pub confidence: f64,
}

impl From<Prediction> for ClassificationResponse {
    fn from(prediction: Prediction) -> Self {
        ClassificationResponse {
            is_phishing: prediction.is_phishing(),
            confidence: prediction.confidence,
        }
    }
}

/// Health snapshot of a [`ServingPipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// A pair is loaded and requests are being served.
    pub ready: bool,
    pub fingerprint: Option<Uuid>,
    pub trained_at: Option<DateTime<Utc>>,
    pub vocabulary_size: Option<usize>,
    pub artifact_dir: Option<PathBuf>,
    /// Why the pipeline is degraded, or why the last reload failed.
    pub error: Option<String>,
}

#[derive(Default)]
struct Slot {
    pair: Option<Arc<ArtifactPair>>,
    error: Option<String>,
}

/// Classifies emails with a loaded artifact pair.
pub struct ServingPipeline {
    artifacts: Option<ArtifactConfig>,
    slot: RwLock<Slot>,
}

impl std::fmt::Debug for ServingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServingPipeline")
            .field("artifacts", &self.artifacts)
            .field("status", &self.status())
            .finish()
    }
}

impl ServingPipeline {
    /// Load the artifact pair described by `config`.
    ///
    /// Never fails: a missing, corrupt or mismatched pair leaves the
    /// pipeline degraded, with the cause available from [`status`](Self::status).
    pub fn start(config: ArtifactConfig) -> Self {
        let slot = match load_pair(&config) {
            Ok(pair) => {
                info!(
                    "Loaded artifact pair {} from {} ({} features)",
                    pair.fingerprint(),
                    config.directory.display(),
                    pair.vocabulary_size()
                );
                Slot {
                    pair: Some(Arc::new(pair)),
                    error: None,
                }
            }
            Err(e) => {
                if matches!(e, PhishError::ArtifactMissing { .. }) {
                    warn!("Serving degraded: {e}");
                } else {
                    error!("Serving degraded, failed to load artifacts: {e}");
                }
                Slot {
                    pair: None,
                    error: Some(e.to_string()),
                }
            }
        };
        Self {
            artifacts: Some(config),
            slot: RwLock::new(slot),
        }
    }

    /// Serve an in-memory pair. [`reload`](Self::reload) is unavailable.
    pub fn from_pair(pair: ArtifactPair) -> Self {
        Self {
            artifacts: None,
            slot: RwLock::new(Slot {
                pair: Some(Arc::new(pair)),
                error: None,
            }),
        }
    }

    /// Classify one email.
    ///
    /// Empty or whitespace-only text is rejected with `InvalidInput`
    /// before the model is consulted.
    pub fn classify(&self, text: &str) -> Result<Prediction> {
        validate_text(text)?;
        self.current()?.classify(text)
    }

    /// [`classify`](Self::classify) shaped as a response body.
    pub fn respond(&self, request: &ClassificationRequest) -> Result<ClassificationResponse> {
        self.classify(&request.email).map(ClassificationResponse::from)
    }

    /// Classify many emails in parallel against a single pair.
    ///
    /// Each result stands alone; one rejected email does not affect the
    /// others.
    pub fn classify_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<Result<Prediction>> {
        let pair = self.current();
        texts
            .par_iter()
            .map(|text| {
                let text = text.as_ref();
                validate_text(text)?;
                match &pair {
                    Ok(pair) => pair.classify(text),
                    Err(e) => Err(PhishError::model_unavailable(unavailable_reason(e))),
                }
            })
            .collect()
    }

    /// Re-read the artifact pair from disk and swap it in.
    ///
    /// On failure the pair already in service keeps serving and the error
    /// is returned.
    pub fn reload(&self) -> Result<Uuid> {
        let config = self.artifacts.as_ref().ok_or_else(|| {
            PhishError::config("pipeline was not started from an artifact directory")
        })?;

        match load_pair(config) {
            Ok(pair) => {
                let fingerprint = pair.fingerprint();
                let pair = Arc::new(pair);
                let mut slot = self.slot.write();
                slot.pair = Some(pair);
                slot.error = None;
                info!("Reloaded artifact pair {fingerprint}");
                Ok(fingerprint)
            }
            Err(e) => {
                error!("Reload failed, keeping current artifacts: {e}");
                self.slot.write().error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.slot.read().pair.is_some()
    }

    /// The pair currently in service.
    pub fn pair(&self) -> Option<Arc<ArtifactPair>> {
        self.slot.read().pair.clone()
    }

    pub fn status(&self) -> ServiceStatus {
        let slot = self.slot.read();
        let pair = slot.pair.as_ref();
        ServiceStatus {
            ready: pair.is_some(),
            fingerprint: pair.map(|p| p.fingerprint()),
            trained_at: pair.map(|p| p.metadata().created_at),
            vocabulary_size: pair.map(|p| p.vocabulary_size()),
            artifact_dir: self.artifacts.as_ref().map(|c| c.directory.clone()),
            error: slot.error.clone(),
        }
    }

    fn current(&self) -> Result<Arc<ArtifactPair>> {
        let slot = self.slot.read();
        match &slot.pair {
            Some(pair) => Ok(Arc::clone(pair)),
            None => Err(PhishError::model_unavailable(
                slot.error.as_deref().unwrap_or("no artifacts loaded"),
            )),
        }
    }
}

fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(PhishError::invalid_input("email text cannot be empty"));
    }
    Ok(())
}

fn unavailable_reason(error: &PhishError) -> String {
    match error {
        PhishError::ModelUnavailable(reason) => reason.clone(),
        other => other.to_string(),
    }
}
