//! # PhishNot
//!
//! Phishing email detection with TF-IDF features and logistic regression.
//!
//! ## Features
//!
//! - Email-aware text analysis (lowercasing, stop words, word bigrams)
//! - TF-IDF vectorizer with document-frequency pruning
//! - Class-balanced, L2-regularized logistic regression
//! - Versioned, checksummed artifact pairs with atomic saves
//! - Training pipeline with a stratified hold-out evaluation
//! - Thread-safe serving pipeline with hot reload and a degraded mode
//!
//! ## Example
//!
//! ```
//! use phishnot::prelude::*;
//!
//! let pipeline = TrainingPipeline::new(PhishConfig::default()).unwrap();
//! let (pair, report) = pipeline.train_in_memory(&sample_corpus()).unwrap();
//! assert!(report.metrics.test_accuracy > 0.5);
//!
//! let serving = ServingPipeline::from_pair(pair);
//! let prediction = serving.classify("Verify your account password now").unwrap();
//! assert!((0.5..=1.0).contains(&prediction.confidence));
//! ```

pub mod analysis;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod ml;
pub mod pipeline;

pub mod prelude {
    pub use crate::artifact::{ArtifactConfig, ArtifactPair, load_pair, save_pair};
    pub use crate::config::PhishConfig;
    pub use crate::corpus::{Corpus, Label, LabeledDocument, load_csv, sample_corpus};
    pub use crate::error::{PhishError, Result};
    pub use crate::ml::{LogisticRegression, Prediction, TfIdfVectorizer};
    pub use crate::pipeline::{
        ClassificationRequest, ClassificationResponse, ServingPipeline, TrainingPipeline,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
