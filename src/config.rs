//! Top-level configuration.
//!
//! Every section falls back to its defaults, so a JSON file only needs
//! the values it changes:
//!
//! ```json
//! {
//!   "classifier": { "c": 0.5 },
//!   "artifacts": { "directory": "/var/lib/phishnot" }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactConfig;
use crate::corpus::ColumnAliases;
use crate::error::{PhishError, Result};
use crate::ml::{ClassifierConfig, SplitConfig, VectorizerConfig};

/// Configuration for training and serving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhishConfig {
    pub vectorizer: VectorizerConfig,
    pub classifier: ClassifierConfig,
    pub split: SplitConfig,
    pub columns: ColumnAliases,
    pub artifacts: ArtifactConfig,
}

impl PhishConfig {
    /// Read a JSON configuration file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PhishError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: PhishConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.classifier.validate()?;
        self.split.validate()?;
        self.columns.validate()?;
        self.artifacts.validate()
    }
}
