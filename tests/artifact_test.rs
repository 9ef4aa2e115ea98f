use std::fs;

use tempfile::TempDir;

use phishnot::artifact::format::{HEADER_LEN, MAGIC};
use phishnot::artifact::{ArtifactConfig, ArtifactKind, ArtifactPair, inspect, load_pair, save_pair};
use phishnot::config::PhishConfig;
use phishnot::corpus::sample_corpus;
use phishnot::error::{PhishError, Result};
use phishnot::pipeline::TrainingPipeline;

fn trained_pair() -> Result<ArtifactPair> {
    let pipeline = TrainingPipeline::new(PhishConfig::default())?;
    let (pair, _) = pipeline.train_in_memory(&sample_corpus())?;
    Ok(pair)
}

#[test]
fn saved_pair_loads_back_identically() -> Result<()> {
    let dir = TempDir::new()?;
    let config = ArtifactConfig::in_dir(dir.path().join("models"));
    let pair = trained_pair()?;

    let paths = save_pair(&pair, &config)?;
    assert_eq!(paths.model, config.model_path());
    assert_eq!(paths.vectorizer, config.vectorizer_path());

    let loaded = load_pair(&config)?;
    assert_eq!(loaded.metadata(), pair.metadata());
    assert_eq!(
        loaded.vectorizer().feature_names(),
        pair.vectorizer().feature_names()
    );
    assert_eq!(loaded.vectorizer().idf(), pair.vectorizer().idf());
    assert_eq!(loaded.classifier().parameters(), pair.classifier().parameters());

    for text in [
        "Urgent: verify your account now http://fake-bank.com/login",
        "Meeting reminder: Team standup at 10 AM tomorrow",
    ] {
        assert_eq!(loaded.classify(text)?, pair.classify(text)?);
    }
    Ok(())
}

#[test]
fn save_leaves_no_temporary_files() -> Result<()> {
    let dir = TempDir::new()?;
    let config = ArtifactConfig::in_dir(dir.path());
    save_pair(&trained_pair()?, &config)?;
    save_pair(&trained_pair()?, &config)?;

    let mut names: Vec<String> = fs::read_dir(dir.path())?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    names.sort();
    assert_eq!(names, vec!["phish_model.bin", "vectorizer.bin"]);
    Ok(())
}

#[test]
fn files_carry_the_versioned_header() -> Result<()> {
    let dir = TempDir::new()?;
    let config = ArtifactConfig::in_dir(dir.path());
    save_pair(&trained_pair()?, &config)?;

    let bytes = fs::read(config.model_path())?;
    assert!(bytes.len() > HEADER_LEN);
    assert_eq!(&bytes[..4], MAGIC);

    let report = inspect(&config);
    assert!(report.is_ok());
    assert!(report.consistent);
    assert_eq!(report.model.kind, ArtifactKind::Classifier);
    assert_eq!(report.model.header.map(|h| h.version), Some(1));
    assert_eq!(report.model.size_bytes, Some(bytes.len() as u64));
    Ok(())
}

#[test]
fn pairs_from_different_runs_are_rejected() -> Result<()> {
    let first = TempDir::new()?;
    let second = TempDir::new()?;
    let first_config = ArtifactConfig::in_dir(first.path());
    let second_config = ArtifactConfig::in_dir(second.path());
    save_pair(&trained_pair()?, &first_config)?;
    save_pair(&trained_pair()?, &second_config)?;

    fs::copy(second_config.model_path(), first_config.model_path())?;

    assert!(matches!(
        load_pair(&first_config),
        Err(PhishError::ArtifactMismatch(_))
    ));
    let report = inspect(&first_config);
    assert!(report.vectorizer.is_ok());
    assert!(report.model.is_ok());
    assert!(!report.consistent);
    assert!(!report.is_ok());
    Ok(())
}

#[test]
fn missing_files_are_reported_as_missing() -> Result<()> {
    let dir = TempDir::new()?;
    let config = ArtifactConfig::in_dir(dir.path());
    assert!(matches!(
        load_pair(&config),
        Err(PhishError::ArtifactMissing { .. })
    ));

    save_pair(&trained_pair()?, &config)?;
    fs::remove_file(config.vectorizer_path())?;
    match load_pair(&config) {
        Err(PhishError::ArtifactMissing { path }) => assert!(path.ends_with("vectorizer.bin")),
        other => panic!("expected ArtifactMissing, got {other:?}"),
    }

    let report = inspect(&config);
    assert!(!report.vectorizer.exists);
    assert!(report.model.is_ok());
    assert!(!report.is_ok());
    Ok(())
}

#[test]
fn damaged_files_are_reported_as_corrupt() -> Result<()> {
    let dir = TempDir::new()?;
    let config = ArtifactConfig::in_dir(dir.path());
    save_pair(&trained_pair()?, &config)?;

    // Flip one payload byte: the checksum no longer matches.
    let mut bytes = fs::read(config.model_path())?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(config.model_path(), &bytes)?;
    match load_pair(&config) {
        Err(PhishError::ArtifactCorrupt { reason, .. }) => assert!(reason.contains("checksum")),
        other => panic!("expected ArtifactCorrupt, got {other:?}"),
    }

    // Truncated.
    fs::write(config.model_path(), &bytes[..bytes.len() / 2])?;
    assert!(matches!(
        load_pair(&config),
        Err(PhishError::ArtifactCorrupt { .. })
    ));

    // The files swapped: each header names the other kind.
    save_pair(&trained_pair()?, &config)?;
    let model = fs::read(config.model_path())?;
    let vectorizer = fs::read(config.vectorizer_path())?;
    fs::write(config.model_path(), vectorizer)?;
    fs::write(config.vectorizer_path(), model)?;
    assert!(matches!(
        load_pair(&config),
        Err(PhishError::ArtifactCorrupt { .. })
    ));
    assert!(inspect(&config).vectorizer.error.is_some());
    Ok(())
}

#[test]
fn failed_save_keeps_the_previous_pair() -> Result<()> {
    let dir = TempDir::new()?;
    let config = ArtifactConfig::in_dir(dir.path());
    let original = trained_pair()?;
    save_pair(&original, &config)?;

    // A directory where the model file should go makes the final rename fail.
    let mut blocked = config.clone();
    blocked.model_file = "blocked".to_string();
    fs::create_dir(blocked.model_path())?;
    fs::write(blocked.model_path().join("keep"), b"x")?;
    assert!(save_pair(&trained_pair()?, &blocked).is_err());
    assert!(!dir.path().join("blocked.tmp").exists());

    let loaded = load_pair(&config)?;
    assert_eq!(loaded.fingerprint(), original.fingerprint());
    Ok(())
}
