//! Evaluation metrics for binary phishing classification.
//!
//! Phishing is the positive class. A ratio whose denominator is zero is
//! reported as 0.0.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::corpus::Label;
use crate::error::{PhishError, Result};

/// Counts of actual versus predicted labels.
///
/// `counts[actual][predicted]`, indexed by [`Label::as_index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    /// Tally paired actual and predicted labels.
    pub fn from_labels(actual: &[Label], predicted: &[Label]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(PhishError::invalid_input(format!(
                "{} actual labels but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }
        let mut matrix = ConfusionMatrix::default();
        for (a, p) in actual.iter().zip(predicted) {
            matrix.counts[a.as_index()][p.as_index()] += 1;
        }
        Ok(matrix)
    }

    pub fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    pub fn false_positives(&self) -> usize {
        self.counts[0][1]
    }

    pub fn true_negatives(&self) -> usize {
        self.counts[0][0]
    }

    pub fn false_negatives(&self) -> usize {
        self.counts[1][0]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Samples whose actual label is `label`.
    pub fn support(&self, label: Label) -> usize {
        self.counts[label.as_index()].iter().sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives() + self.true_negatives(), self.total())
    }

    /// Precision with `label` treated as the positive class.
    pub fn precision_for(&self, label: Label) -> f64 {
        let i = label.as_index();
        ratio(self.counts[i][i], self.counts[0][i] + self.counts[1][i])
    }

    /// Recall with `label` treated as the positive class.
    pub fn recall_for(&self, label: Label) -> f64 {
        let i = label.as_index();
        ratio(self.counts[i][i], self.support(label))
    }

    /// F1 with `label` treated as the positive class.
    pub fn f1_for(&self, label: Label) -> f64 {
        harmonic_mean(self.precision_for(label), self.recall_for(label))
    }
}

/// Headline metrics for the phishing class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl From<&ConfusionMatrix> for Metrics {
    fn from(matrix: &ConfusionMatrix) -> Self {
        Metrics {
            accuracy: matrix.accuracy(),
            precision: matrix.precision_for(Label::Phishing),
            recall: matrix.recall_for(Label::Phishing),
            f1: matrix.f1_for(Label::Phishing),
        }
    }
}

/// Per-class row of a [`ClassificationReport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision, recall and F1 with macro and weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub safe: ClassScores,
    pub phishing: ClassScores,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl From<&ConfusionMatrix> for ClassificationReport {
    fn from(matrix: &ConfusionMatrix) -> Self {
        let row = |label| ClassScores {
            precision: matrix.precision_for(label),
            recall: matrix.recall_for(label),
            f1: matrix.f1_for(label),
            support: matrix.support(label),
        };
        let safe = row(Label::Safe);
        let phishing = row(Label::Phishing);
        let total = safe.support + phishing.support;

        let macro_avg = ClassScores {
            precision: (safe.precision + phishing.precision) / 2.0,
            recall: (safe.recall + phishing.recall) / 2.0,
            f1: (safe.f1 + phishing.f1) / 2.0,
            support: total,
        };
        let weighted = |f: fn(&ClassScores) -> f64| {
            if total == 0 {
                0.0
            } else {
                (f(&safe) * safe.support as f64 + f(&phishing) * phishing.support as f64)
                    / total as f64
            }
        };
        let weighted_avg = ClassScores {
            precision: weighted(|s| s.precision),
            recall: weighted(|s| s.recall),
            f1: weighted(|s| s.f1),
            support: total,
        };

        ClassificationReport {
            safe,
            phishing,
            accuracy: matrix.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, scores) in [("safe", &self.safe), ("phishing", &self.phishing)] {
            write_row(f, name, scores)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, scores: &ClassScores) -> fmt::Result {
    writeln!(
        f,
        "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
        name, scores.precision, scores.recall, scores.f1, scores.support
    )
}

/// Confusion matrix, headline metrics and full report in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub metrics: Metrics,
    pub confusion_matrix: ConfusionMatrix,
    pub report: ClassificationReport,
}

/// Score predictions against the true labels.
pub fn evaluate(actual: &[Label], predicted: &[Label]) -> Result<Evaluation> {
    let confusion_matrix = ConfusionMatrix::from_labels(actual, predicted)?;
    Ok(Evaluation {
        metrics: Metrics::from(&confusion_matrix),
        report: ClassificationReport::from(&confusion_matrix),
        confusion_matrix,
    })
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a + b == 0.0 { 0.0 } else { 2.0 * a * b / (a + b) }
}
