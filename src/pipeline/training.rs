//! Training pipeline.
//!
//! load corpus → stratified split → fit vectorizer on the training
//! partition → fit classifier → evaluate on the test partition → persist
//! the artifact pair.

use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::{ArtifactPair, ArtifactPaths, save_pair};
use crate::config::PhishConfig;
use crate::corpus::{Corpus, Label, load_csv, sample_corpus};
use crate::error::{PhishError, Result};
use crate::ml::{
    ClassificationReport, ConfusionMatrix, FeatureVector, LogisticRegression, TfIdfVectorizer,
    TrainingStats, evaluate, stratified_split,
};

/// Headline scores of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    /// Phishing-class precision on the test partition.
    pub precision: f64,
    /// Phishing-class recall on the test partition.
    pub recall: f64,
    /// Phishing-class F1 on the test partition.
    pub f1: f64,
}

/// Everything an operator needs to judge a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub fingerprint: Uuid,
    pub created_at: DateTime<Utc>,
    pub train_size: usize,
    pub test_size: usize,
    pub vocabulary_size: usize,
    pub metrics: TrainingMetrics,
    pub confusion_matrix: ConfusionMatrix,
    pub classification_report: ClassificationReport,
    pub training: TrainingStats,
    /// Set once the pair has been written to disk.
    pub artifacts: Option<ArtifactPaths>,
}

/// Fits and persists a vectorizer/classifier pair.
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    config: PhishConfig,
}

impl TrainingPipeline {
    pub fn new(config: PhishConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PhishConfig {
        &self.config
    }

    /// Read the CSV at `dataset`, or fall back to the built-in sample
    /// corpus when no path is given.
    pub fn load_corpus(&self, dataset: Option<&Path>) -> Result<Corpus> {
        match dataset {
            Some(path) => load_csv(path, &self.config.columns),
            None => {
                info!("No dataset supplied, using the built-in sample corpus");
                Ok(sample_corpus())
            }
        }
    }

    /// Train on `corpus` and return the pair without writing it.
    ///
    /// The vectorizer only ever sees the training partition.
    pub fn train_in_memory(&self, corpus: &Corpus) -> Result<(ArtifactPair, TrainingReport)> {
        if corpus.is_empty() {
            return Err(PhishError::insufficient_data("training corpus is empty"));
        }
        let [safe, phishing] = corpus.class_counts();
        info!(
            "Training on {} emails ({phishing} phishing, {safe} legitimate)",
            corpus.len()
        );

        let split = stratified_split(&corpus.labels(), &self.config.split)?;
        let train = corpus.select(&split.train);
        let test = corpus.select(&split.test);
        info!(
            "Split into {} training and {} test emails",
            train.len(),
            test.len()
        );

        let mut vectorizer = TfIdfVectorizer::new(self.config.vectorizer.clone())?;
        let x_train = vectorizer.fit_transform(&train.texts())?;
        info!("Fitted vocabulary of {} terms", vectorizer.vocabulary_size());

        let mut classifier = LogisticRegression::new(self.config.classifier.clone())?;
        let stats = classifier.fit(&x_train, &train.labels())?;
        info!(
            "Fitted classifier in {} iterations ({} ms)",
            stats.iterations, stats.training_time_ms
        );

        let x_test = vectorizer.transform_batch(&test.texts())?;
        let train_eval = evaluate(&train.labels(), &predict_labels(&classifier, &x_train)?)?;
        let test_eval = evaluate(&test.labels(), &predict_labels(&classifier, &x_test)?)?;

        let metrics = TrainingMetrics {
            train_accuracy: train_eval.metrics.accuracy,
            test_accuracy: test_eval.metrics.accuracy,
            precision: test_eval.metrics.precision,
            recall: test_eval.metrics.recall,
            f1: test_eval.metrics.f1,
        };
        info!(
            "Test accuracy {:.4}, precision {:.4}, recall {:.4}, F1 {:.4}",
            metrics.test_accuracy, metrics.precision, metrics.recall, metrics.f1
        );

        let pair = ArtifactPair::new(vectorizer, classifier)?;
        let report = TrainingReport {
            fingerprint: pair.fingerprint(),
            created_at: pair.metadata().created_at,
            train_size: train.len(),
            test_size: test.len(),
            vocabulary_size: pair.vocabulary_size(),
            metrics,
            confusion_matrix: test_eval.confusion_matrix,
            classification_report: test_eval.report,
            training: stats,
            artifacts: None,
        };
        Ok((pair, report))
    }

    /// Train on `corpus` and persist the pair to the configured directory.
    pub fn run(&self, corpus: &Corpus) -> Result<TrainingReport> {
        let (pair, mut report) = self.train_in_memory(corpus)?;
        report.artifacts = Some(save_pair(&pair, &self.config.artifacts)?);
        Ok(report)
    }

    /// [`load_corpus`](Self::load_corpus) followed by [`run`](Self::run).
    pub fn run_from_source(&self, dataset: Option<&Path>) -> Result<TrainingReport> {
        let corpus = self.load_corpus(dataset)?;
        self.run(&corpus)
    }
}

fn predict_labels(
    classifier: &LogisticRegression,
    features: &[FeatureVector],
) -> Result<Vec<Label>> {
    features
        .iter()
        .map(|v| classifier.predict(v).map(|p| p.label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LabeledDocument;

    #[test]
    fn test_train_in_memory_on_sample() {
        let pipeline = TrainingPipeline::new(PhishConfig::default()).unwrap();
        let (pair, report) = pipeline.train_in_memory(&sample_corpus()).unwrap();

        assert_eq!(report.train_size, 48);
        assert_eq!(report.test_size, 12);
        assert_eq!(report.vocabulary_size, pair.vocabulary_size());
        assert_eq!(report.fingerprint, pair.fingerprint());
        assert_eq!(report.confusion_matrix.total(), 12);
        assert!(report.artifacts.is_none());
        assert!(report.training.converged);
    }

    #[test]
    fn test_single_class_corpus_fails() {
        let corpus: Corpus = (0..10)
            .map(|i| LabeledDocument::new(format!("invoice number {i} attached"), Label::Safe))
            .collect();
        let pipeline = TrainingPipeline::new(PhishConfig::default()).unwrap();
        assert!(matches!(
            pipeline.train_in_memory(&corpus),
            Err(PhishError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_empty_corpus_fails() {
        let pipeline = TrainingPipeline::new(PhishConfig::default()).unwrap();
        assert!(pipeline.train_in_memory(&Corpus::new()).is_err());
    }

    #[test]
    fn test_load_corpus_defaults_to_sample() {
        let pipeline = TrainingPipeline::new(PhishConfig::default()).unwrap();
        assert_eq!(pipeline.load_corpus(None).unwrap().len(), 60);
    }
}
