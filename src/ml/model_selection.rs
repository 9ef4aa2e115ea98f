//! Train/test splitting.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::corpus::Label;
use crate::error::{PhishError, Result};

/// Configuration for [`stratified_split`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of each class held out for testing.
    pub test_size: f64,
    /// Seed for the shuffle; equal seeds give equal splits.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PhishError::config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        Ok(())
    }
}

/// Indices of the training and test partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split sample indices so both partitions keep the class proportions.
///
/// Each class contributes `round(n_class * test_size)` test samples,
/// at least one and at most `n_class - 1`. Both partitions are returned
/// in ascending index order and never overlap.
pub fn stratified_split(labels: &[Label], config: &SplitConfig) -> Result<Split> {
    config.validate()?;

    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (i, label) in labels.iter().enumerate() {
        by_class[label.as_index()].push(i);
    }
    for (members, label) in by_class.iter().zip([Label::Safe, Label::Phishing]) {
        if members.len() < 2 {
            return Err(PhishError::insufficient_data(format!(
                "stratified split needs at least 2 {label} examples, got {}",
                members.len()
            )));
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for members in &mut by_class {
        members.shuffle(&mut rng);
        let n = members.len();
        let n_test = ((n as f64 * config.test_size).round() as usize).clamp(1, n - 1);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();

    Ok(Split { train, test })
}
