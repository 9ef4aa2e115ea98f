use std::fs;

use tempfile::TempDir;

use phishnot::artifact::{ArtifactConfig, load_pair};
use phishnot::config::PhishConfig;
use phishnot::corpus::{Corpus, Label, LabeledDocument, sample_corpus};
use phishnot::error::{PhishError, Result};
use phishnot::ml::{SplitConfig, TfIdfVectorizer, VectorizerConfig, stratified_split};
use phishnot::pipeline::TrainingPipeline;

fn pipeline_in(dir: &TempDir) -> Result<TrainingPipeline> {
    let mut config = PhishConfig::default();
    config.artifacts = ArtifactConfig::in_dir(dir.path());
    TrainingPipeline::new(config)
}

#[test]
fn sample_corpus_reaches_accuracy_floor() -> Result<()> {
    let dir = TempDir::new()?;
    let report = pipeline_in(&dir)?.run(&sample_corpus())?;

    assert_eq!(report.train_size + report.test_size, 60);
    assert!(
        report.metrics.test_accuracy >= 0.8,
        "test accuracy {} below 0.8",
        report.metrics.test_accuracy
    );
    assert!(report.training.converged);
    assert!(report.training.warning.is_none());

    let paths = report.artifacts.expect("artifacts should be written");
    assert!(paths.model.is_file());
    assert!(paths.vectorizer.is_file());
    Ok(())
}

#[test]
fn stratified_split_preserves_class_ratio() -> Result<()> {
    let corpus = sample_corpus();
    let split = stratified_split(&corpus.labels(), &SplitConfig::default())?;

    let test = corpus.select(&split.test);
    assert_eq!(test.class_counts(), [6, 6]);
    assert_eq!(split.train.len(), 48);

    let again = stratified_split(&corpus.labels(), &SplitConfig::default())?;
    assert_eq!(split, again);
    Ok(())
}

#[test]
fn held_out_documents_never_reach_the_vocabulary() -> Result<()> {
    let corpus = sample_corpus();
    let split = stratified_split(&corpus.labels(), &SplitConfig::default())?;

    // Same labels, so the split is identical; only held-out texts differ.
    let altered: Corpus = corpus
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            if split.test.contains(&i) {
                LabeledDocument::new(
                    format!("zebra quantum marmalade {i} zebra quantum"),
                    doc.label,
                )
            } else {
                doc.clone()
            }
        })
        .collect();

    let pipeline = TrainingPipeline::new(PhishConfig::default())?;
    let (original, _) = pipeline.train_in_memory(&corpus)?;
    let (changed, _) = pipeline.train_in_memory(&altered)?;

    assert_eq!(
        original.vectorizer().feature_names(),
        changed.vectorizer().feature_names()
    );
    assert_eq!(original.vectorizer().idf(), changed.vectorizer().idf());
    assert!(changed.vectorizer().index_of("zebra").is_none());
    assert_eq!(original.vectorizer().n_documents(), 48);
    Ok(())
}

#[test]
fn refitting_vectorizer_is_idempotent() -> Result<()> {
    let corpus = sample_corpus();
    let texts = corpus.texts();

    let mut first = TfIdfVectorizer::new(VectorizerConfig::default())?;
    first.fit(&texts)?;
    let mut second = TfIdfVectorizer::new(VectorizerConfig::default())?;
    second.fit(&texts)?;
    let names = first.feature_names().to_vec();
    let idf = first.idf().to_vec();
    first.fit(&texts)?;

    assert_eq!(first.feature_names(), second.feature_names());
    assert_eq!(first.idf(), second.idf());
    assert_eq!(first.feature_names(), names.as_slice());
    assert_eq!(first.idf(), idf.as_slice());
    assert!(first.idf().iter().all(|w| *w > 0.0));
    Ok(())
}

#[test]
fn trains_from_csv_with_aliased_columns() -> Result<()> {
    let dir = TempDir::new()?;
    let dataset = dir.path().join("emails.csv");

    let mut csv = String::from("Body,is_phishing\n");
    let corpus = sample_corpus();
    for doc in corpus.iter() {
        let label = if doc.label == Label::Phishing { "yes" } else { "no" };
        csv.push_str(&format!("\"{}\",{label}\n", doc.text.replace('"', "\"\"")));
    }
    fs::write(&dataset, csv)?;

    let report = pipeline_in(&dir)?.run_from_source(Some(&dataset))?;
    assert_eq!(report.train_size + report.test_size, 60);

    let pair = load_pair(&ArtifactConfig::in_dir(dir.path()))?;
    assert_eq!(pair.fingerprint(), report.fingerprint);
    assert_eq!(pair.vocabulary_size(), report.vocabulary_size);
    Ok(())
}

#[test]
fn missing_dataset_is_an_error() -> Result<()> {
    let dir = TempDir::new()?;
    let missing = dir.path().join("nope.csv");
    assert!(pipeline_in(&dir)?.run_from_source(Some(&missing)).is_err());
    assert!(!dir.path().join("phish_model.bin").exists());
    Ok(())
}

#[test]
fn single_class_corpus_aborts_without_writing() -> Result<()> {
    let dir = TempDir::new()?;
    let corpus: Corpus = sample_corpus()
        .into_iter()
        .filter(|doc| doc.label == Label::Phishing)
        .collect();

    let result = pipeline_in(&dir)?.run(&corpus);
    assert!(matches!(result, Err(PhishError::InsufficientData(_))));
    assert!(!dir.path().join("phish_model.bin").exists());
    assert!(!dir.path().join("vectorizer.bin").exists());
    Ok(())
}
