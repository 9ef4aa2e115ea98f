//! Saving, loading and inspecting artifact pairs on disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{PhishError, Result};
use crate::ml::{LogisticRegression, TfIdfVectorizer};

use super::format::{self, ArtifactHeader, ArtifactKind};
use super::{
    ArtifactConfig, ArtifactMetadata, ArtifactPair, ClassifierArtifact, VectorizerArtifact,
};

/// Paths written by [`save_pair`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub vectorizer: PathBuf,
}

/// Persist both artifacts so that either both files are replaced or
/// neither is.
///
/// Both payloads are encoded in memory, written to `*.tmp` siblings and
/// synced, then renamed into place. The vectorizer being replaced is kept
/// as `*.bak` until the model rename succeeds, and restored if it fails.
pub fn save_pair(pair: &ArtifactPair, config: &ArtifactConfig) -> Result<ArtifactPaths> {
    config.validate()?;
    let (vectorizer, classifier) = pair.to_artifacts()?;
    let vectorizer_bytes = format::encode(ArtifactKind::Vectorizer, &vectorizer)?;
    let model_bytes = format::encode(ArtifactKind::Classifier, &classifier)?;

    fs::create_dir_all(&config.directory)?;
    let paths = ArtifactPaths {
        model: config.model_path(),
        vectorizer: config.vectorizer_path(),
    };
    let vectorizer_tmp = sibling(&paths.vectorizer, "tmp");
    let model_tmp = sibling(&paths.model, "tmp");
    let backup = sibling(&paths.vectorizer, "bak");

    let staged = write_synced(&vectorizer_tmp, &vectorizer_bytes)
        .and_then(|_| write_synced(&model_tmp, &model_bytes));
    if let Err(e) = staged {
        remove_quietly(&[vectorizer_tmp.as_path(), model_tmp.as_path()]);
        return Err(e.into());
    }

    let previous = paths.vectorizer.is_file().then_some(backup.as_path());
    if let Err(e) = commit(&paths, &vectorizer_tmp, &model_tmp, previous) {
        match previous {
            Some(backup) if backup.exists() => {
                if let Err(restore) = fs::rename(backup, &paths.vectorizer) {
                    warn!(
                        "Failed to restore {}: {restore}",
                        paths.vectorizer.display()
                    );
                }
            }
            Some(_) => {}
            None => remove_quietly(&[paths.vectorizer.as_path()]),
        }
        remove_quietly(&[vectorizer_tmp.as_path(), model_tmp.as_path()]);
        return Err(e.into());
    }
    if previous.is_some() {
        remove_quietly(&[backup.as_path()]);
    }

    info!(
        "Saved artifact pair {} to {}",
        pair.fingerprint(),
        config.directory.display()
    );
    Ok(paths)
}

fn commit(
    paths: &ArtifactPaths,
    vectorizer_tmp: &Path,
    model_tmp: &Path,
    backup: Option<&Path>,
) -> std::io::Result<()> {
    if let Some(backup) = backup {
        fs::rename(&paths.vectorizer, backup)?;
    }
    fs::rename(vectorizer_tmp, &paths.vectorizer)?;
    fs::rename(model_tmp, &paths.model)
}

fn remove_quietly(paths: &[&Path]) {
    for path in paths {
        if path.exists()
            && let Err(e) = fs::remove_file(path)
        {
            warn!("Failed to remove {}: {e}", path.display());
        }
    }
}

/// Load and verify the artifact pair described by `config`.
///
/// Fails with `ArtifactMissing` if either file is absent,
/// `ArtifactCorrupt` if either cannot be decoded, and `ArtifactMismatch`
/// if the two files come from different training runs.
pub fn load_pair(config: &ArtifactConfig) -> Result<ArtifactPair> {
    let model_path = config.model_path();
    let vectorizer_path = config.vectorizer_path();
    for path in [&vectorizer_path, &model_path] {
        if !path.is_file() {
            return Err(PhishError::artifact_missing(path));
        }
    }

    let vectorizer: VectorizerArtifact = format::decode(
        &vectorizer_path,
        &fs::read(&vectorizer_path)?,
        ArtifactKind::Vectorizer,
    )?;
    let classifier: ClassifierArtifact =
        format::decode(&model_path, &fs::read(&model_path)?, ArtifactKind::Classifier)?;

    if vectorizer.metadata.fingerprint != classifier.metadata.fingerprint {
        return Err(PhishError::artifact_mismatch(format!(
            "vectorizer fingerprint {} does not match classifier fingerprint {}",
            vectorizer.metadata.fingerprint, classifier.metadata.fingerprint
        )));
    }

    let metadata = vectorizer.metadata;
    let vectorizer = TfIdfVectorizer::from_state(vectorizer.state)
        .map_err(|e| PhishError::artifact_corrupt(&vectorizer_path, e.to_string()))?;
    let classifier = LogisticRegression::from_state(classifier.state)
        .map_err(|e| PhishError::artifact_corrupt(&model_path, e.to_string()))?;
    let pair = ArtifactPair::with_metadata(metadata, vectorizer, classifier)?;

    debug!(
        "Loaded artifact pair {} ({} features)",
        pair.fingerprint(),
        pair.vocabulary_size()
    );
    Ok(pair)
}

/// What [`inspect`] found for one artifact file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactFileReport {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub exists: bool,
    pub size_bytes: Option<u64>,
    pub header: Option<ArtifactHeader>,
    pub metadata: Option<ArtifactMetadata>,
    /// Why the file could not be read or decoded.
    pub error: Option<String>,
}

impl ArtifactFileReport {
    pub fn is_ok(&self) -> bool {
        self.exists && self.error.is_none()
    }
}

/// Result of [`inspect`]ing an artifact directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactInspection {
    pub directory: PathBuf,
    pub vectorizer: ArtifactFileReport,
    pub model: ArtifactFileReport,
    /// Both files decode and carry the same fingerprint.
    pub consistent: bool,
}

impl ArtifactInspection {
    pub fn is_ok(&self) -> bool {
        self.vectorizer.is_ok() && self.model.is_ok() && self.consistent
    }
}

/// Report presence, size, header and metadata of both artifact files.
///
/// Never fails; problems are recorded in the report.
pub fn inspect(config: &ArtifactConfig) -> ArtifactInspection {
    let vectorizer = inspect_file::<VectorizerArtifact>(
        config.vectorizer_path(),
        ArtifactKind::Vectorizer,
        |a| a.metadata,
    );
    let model = inspect_file::<ClassifierArtifact>(
        config.model_path(),
        ArtifactKind::Classifier,
        |a| a.metadata,
    );
    let consistent = match (&vectorizer.metadata, &model.metadata) {
        (Some(v), Some(m)) => v.fingerprint == m.fingerprint && v.n_features == m.n_features,
        _ => false,
    };
    ArtifactInspection {
        directory: config.directory.clone(),
        vectorizer,
        model,
        consistent,
    }
}

fn inspect_file<T: serde::de::DeserializeOwned>(
    path: PathBuf,
    kind: ArtifactKind,
    metadata_of: fn(&T) -> ArtifactMetadata,
) -> ArtifactFileReport {
    let mut report = ArtifactFileReport {
        kind,
        path,
        exists: false,
        size_bytes: None,
        header: None,
        metadata: None,
        error: None,
    };
    if !report.path.is_file() {
        report.error = Some("file not found".to_string());
        return report;
    }
    report.exists = true;

    let bytes = match fs::read(&report.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            report.error = Some(e.to_string());
            return report;
        }
    };
    report.size_bytes = Some(bytes.len() as u64);
    report.header = ArtifactHeader::parse(&bytes).ok();

    match format::decode::<T>(&report.path, &bytes, kind) {
        Ok(artifact) => report.metadata = Some(metadata_of(&artifact)),
        Err(e) => report.error = Some(e.to_string()),
    }
    report
}

/// `dir/name.ext` -> `dir/name.ext.{suffix}`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}
