//! Labeled email corpora.
//!
//! A [`Corpus`] is an ordered list of [`LabeledDocument`]s. It can be
//! read from CSV with [`load_csv`] or taken from the built-in
//! [`sample_corpus`].

mod label;
mod loader;
mod sample;

pub use label::*;
pub use loader::*;
pub use sample::*;

use serde::{Deserialize, Serialize};

/// A single email with its class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledDocument {
    pub text: String,
    pub label: Label,
}

impl LabeledDocument {
    pub fn new<S: Into<String>>(text: S, label: Label) -> Self {
        LabeledDocument {
            text: text.into(),
            label,
        }
    }
}

/// An ordered collection of labeled emails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    documents: Vec<LabeledDocument>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, document: LabeledDocument) {
        self.documents.push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[LabeledDocument] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabeledDocument> {
        self.documents.iter()
    }

    /// Document texts in corpus order.
    pub fn texts(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.text.as_str()).collect()
    }

    /// Labels in corpus order.
    pub fn labels(&self) -> Vec<Label> {
        self.documents.iter().map(|d| d.label).collect()
    }

    /// Documents per class, indexed by [`Label::as_index`].
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0; 2];
        for document in &self.documents {
            counts[document.label.as_index()] += 1;
        }
        counts
    }

    /// A new corpus holding the documents at `indices`, in that order.
    ///
    /// Panics if an index is out of range.
    pub fn select(&self, indices: &[usize]) -> Corpus {
        indices
            .iter()
            .map(|&i| self.documents[i].clone())
            .collect()
    }

    /// Append every document of `other`.
    pub fn extend(&mut self, other: Corpus) {
        self.documents.extend(other.documents);
    }
}

impl FromIterator<LabeledDocument> for Corpus {
    fn from_iter<I: IntoIterator<Item = LabeledDocument>>(iter: I) -> Self {
        Corpus {
            documents: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Corpus {
    type Item = LabeledDocument;
    type IntoIter = std::vec::IntoIter<LabeledDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a LabeledDocument;
    type IntoIter = std::slice::Iter<'a, LabeledDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_counts_and_select() {
        let corpus: Corpus = vec![
            LabeledDocument::new("a", Label::Phishing),
            LabeledDocument::new("b", Label::Safe),
            LabeledDocument::new("c", Label::Safe),
        ]
        .into_iter()
        .collect();

        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.class_counts(), [2, 1]);

        let picked = corpus.select(&[2, 0]);
        assert_eq!(picked.texts(), vec!["c", "a"]);
        assert_eq!(picked.labels(), vec![Label::Safe, Label::Phishing]);
    }

    #[test]
    fn test_extend() {
        let mut corpus = Corpus::new();
        assert!(corpus.is_empty());
        corpus.push(LabeledDocument::new("x", Label::Safe));
        corpus.extend(sample_corpus());
        assert_eq!(corpus.len(), 61);
    }
}
