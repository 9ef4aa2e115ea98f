//! TF-IDF vectorizer for email text.
//!
//! [`TfIdfVectorizer::fit`] builds a frozen vocabulary with IDF weights from a
//! training corpus; [`TfIdfVectorizer::transform`] maps any document onto it.
//!
//! Fitting, in order:
//! 1. analyze every document into unigrams and bigrams (stop words removed)
//! 2. count document frequency and corpus term frequency per term
//! 3. drop terms with `df < min_df` or `df / N > max_df`
//! 4. rank the rest by `corpus_count × idf` (ties: lexicographic) and keep
//!    at most `max_features`; indices follow the ranking
//! 5. `idf = ln((1 + N) / (1 + df)) + 1`

use std::collections::hash_map::Entry;

use ahash::{AHashMap, AHashSet};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, EmailAnalyzer};
use crate::error::{PhishError, Result};
use crate::ml::features::FeatureVector;

/// Configuration for the TF-IDF vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Upper bound on vocabulary size.
    pub max_features: usize,
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    /// Inclusive word n-gram range.
    pub ngram_range: (usize, usize),
    /// Remove English stop words before building n-grams.
    pub stop_words: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 8000,
            min_df: 2,
            max_df: 0.95,
            ngram_range: (1, 2),
            stop_words: true,
        }
    }
}

impl VectorizerConfig {
    /// Reject settings that cannot produce a vocabulary.
    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(PhishError::config("max_features must be positive"));
        }
        if self.min_df == 0 {
            return Err(PhishError::config("min_df must be at least 1"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(PhishError::config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(PhishError::config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        Ok(())
    }
}

/// Serializable fitted state of a [`TfIdfVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerState {
    pub config: VectorizerConfig,
    /// Terms in feature-index order.
    pub terms: Vec<String>,
    /// IDF weight per feature index.
    pub idf: Vec<f64>,
    /// Corpus size at fit time.
    pub n_documents: usize,
}

/// TF-IDF vectorizer over unigrams and bigrams.
#[derive(Clone)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    analyzer: EmailAnalyzer,
    /// Terms in feature-index order.
    terms: Vec<String>,
    /// Vocabulary: term -> index mapping.
    vocabulary: AHashMap<String, usize>,
    /// Inverse document frequency for each term.
    idf: Vec<f64>,
    /// Total number of documents seen during training.
    n_documents: usize,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("analyzer", &self.analyzer.name())
            .field("config", &self.config)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Result<Self> {
        config.validate()?;
        let analyzer = EmailAnalyzer::new(config.ngram_range, config.stop_words)?;
        Ok(Self {
            config,
            analyzer,
            terms: Vec::new(),
            vocabulary: AHashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
        })
    }

    /// Fit the vocabulary and IDF weights on training documents.
    ///
    /// Any previous fit is discarded. Fails with `EmptyVocabulary` when the
    /// corpus is empty or pruning leaves no terms.
    pub fn fit<S: AsRef<str> + Sync>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(PhishError::empty_vocabulary("cannot fit on an empty corpus"));
        }

        let analyzed: Vec<Vec<String>> = documents
            .par_iter()
            .map(|doc| self.analyzer.terms(doc.as_ref()))
            .collect::<Result<_>>()?;

        let n_documents = documents.len();
        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();
        let mut corpus_count: AHashMap<String, usize> = AHashMap::new();

        for terms in analyzed {
            let mut seen: AHashSet<&str> = AHashSet::new();
            for term in &terms {
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.clone()).or_insert(0) += 1;
                }
                *corpus_count.entry(term.clone()).or_insert(0) += 1;
            }
        }
        let candidate_count = document_frequency.len();

        let max_doc_count = self.config.max_df * n_documents as f64;
        let mut ranked: Vec<(String, f64, f64)> = document_frequency
            .into_iter()
            .filter(|&(_, df)| df >= self.config.min_df && (df as f64) <= max_doc_count)
            .map(|(term, df)| {
                let idf = smooth_idf(n_documents, df);
                let count = corpus_count.get(&term).copied().unwrap_or(0);
                let score = count as f64 * idf;
                (term, score, idf)
            })
            .collect();

        if ranked.is_empty() {
            return Err(PhishError::empty_vocabulary(format!(
                "no terms remain after pruning {candidate_count} candidates \
                 (min_df={}, max_df={})",
                self.config.min_df, self.config.max_df
            )));
        }

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.config.max_features);

        let mut terms = Vec::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        let mut vocabulary = AHashMap::with_capacity(ranked.len());
        for (index, (term, _, weight)) in ranked.into_iter().enumerate() {
            vocabulary.insert(term.clone(), index);
            terms.push(term);
            idf.push(weight);
        }

        debug!(
            "fitted vocabulary: {} of {} candidate terms over {} documents",
            terms.len(),
            candidate_count,
            n_documents
        );

        self.terms = terms;
        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n_documents;
        Ok(())
    }

    /// Transform a document into an L2-normalized TF-IDF feature vector.
    ///
    /// Out-of-vocabulary terms contribute nothing; a document with no known
    /// terms yields the zero vector.
    pub fn transform(&self, document: &str) -> Result<FeatureVector> {
        if !self.is_fitted() {
            return Err(PhishError::empty_vocabulary(
                "transform called before the vectorizer was fitted",
            ));
        }

        let mut counts: AHashMap<usize, f64> = AHashMap::new();
        for term in self.analyzer.analyze(document)? {
            if let Some(&index) = self.vocabulary.get(&term.text) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        Ok(FeatureVector::from_pairs(self.terms.len(), pairs)?.l2_normalized())
    }

    /// Transform many documents in parallel, preserving order.
    pub fn transform_batch<S: AsRef<str> + Sync>(
        &self,
        documents: &[S],
    ) -> Result<Vec<FeatureVector>> {
        documents
            .par_iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    /// Fit, then transform the same documents.
    pub fn fit_transform<S: AsRef<str> + Sync>(
        &mut self,
        documents: &[S],
    ) -> Result<Vec<FeatureVector>> {
        self.fit(documents)?;
        self.transform_batch(documents)
    }

    pub fn is_fitted(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Term -> feature index mapping.
    pub fn vocabulary(&self) -> &AHashMap<String, usize> {
        &self.vocabulary
    }

    /// Terms in feature-index order.
    pub fn feature_names(&self) -> &[String] {
        &self.terms
    }

    /// IDF weight per feature index.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Snapshot the fitted state for persistence.
    pub fn to_state(&self) -> VectorizerState {
        VectorizerState {
            config: self.config.clone(),
            terms: self.terms.clone(),
            idf: self.idf.clone(),
            n_documents: self.n_documents,
        }
    }

    /// Rebuild a vectorizer from persisted state, checking its consistency.
    pub fn from_state(state: VectorizerState) -> Result<Self> {
        let mut vectorizer = Self::new(state.config)?;

        if state.terms.len() != state.idf.len() {
            return Err(PhishError::other(format!(
                "vocabulary has {} terms but {} idf weights",
                state.terms.len(),
                state.idf.len()
            )));
        }
        if let Some(bad) = state.idf.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(PhishError::other(format!("invalid idf weight {bad}")));
        }

        let mut vocabulary = AHashMap::with_capacity(state.terms.len());
        for (index, term) in state.terms.iter().enumerate() {
            match vocabulary.entry(term.clone()) {
                Entry::Occupied(_) => {
                    return Err(PhishError::other(format!("duplicate term {term:?}")));
                }
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
            }
        }

        vectorizer.terms = state.terms;
        vectorizer.idf = state.idf;
        vectorizer.vocabulary = vocabulary;
        vectorizer.n_documents = state.n_documents;
        Ok(vectorizer)
    }
}

/// Smoothed inverse document frequency; strictly positive for `df <= n`.
pub fn smooth_idf(n_documents: usize, df: usize) -> f64 {
    ((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec![
            "verify your account now",
            "verify your password today",
            "meeting notes for the team",
            "team meeting moved to friday",
            "account summary for the month",
        ]
    }

    fn fitted() -> TfIdfVectorizer {
        let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig::default()).unwrap();
        vectorizer.fit(&corpus()).unwrap();
        vectorizer
    }

    #[test]
    fn test_min_df_pruning() {
        let vectorizer = fitted();
        let mut names = vectorizer.feature_names().to_vec();
        names.sort();
        assert_eq!(names, vec!["account", "meeting", "team", "verify"]);
        assert_eq!(vectorizer.n_documents(), 5);
    }

    #[test]
    fn test_idf_formula() {
        let vectorizer = fitted();
        let index = vectorizer.index_of("verify").unwrap();
        let expected = (6.0f64 / 3.0).ln() + 1.0;
        assert!((vectorizer.idf()[index] - expected).abs() < 1e-12);
        assert!(vectorizer.idf().iter().all(|w| *w > 0.0));
    }

    #[test]
    fn test_max_df_pruning() {
        let docs = vec!["alpha beta", "alpha gamma", "alpha beta", "alpha gamma"];
        let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig {
            max_df: 0.9,
            ngram_range: (1, 1),
            ..Default::default()
        })
        .unwrap();
        vectorizer.fit(&docs).unwrap();
        assert!(vectorizer.index_of("alpha").is_none());
        assert!(vectorizer.index_of("beta").is_some());
    }

    #[test]
    fn test_max_features_ranking_and_ties() {
        let docs = vec!["bbb aaa ccc", "bbb aaa ccc", "ccc ddd", "ccc ddd"];
        let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig {
            max_features: 2,
            max_df: 1.0,
            ngram_range: (1, 1),
            ..Default::default()
        })
        .unwrap();
        vectorizer.fit(&docs).unwrap();
        // ccc: count 4, idf 1.0 -> 4.0; aaa/bbb/ddd: count 2, idf ln(5/3)+1 -> ~3.02
        assert_eq!(vectorizer.feature_names(), &["ccc", "aaa"]);
    }

    #[test]
    fn test_transform_unit_norm() {
        let vectorizer = fitted();
        let v = vectorizer.transform("Verify the team account").unwrap();
        assert_eq!(v.dim(), vectorizer.vocabulary_size());
        assert_eq!(v.nnz(), 3);
        assert!((v.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_term_frequency() {
        let vectorizer = fitted();
        let v = vectorizer.transform("verify verify team").unwrap();
        let verify = v.get(vectorizer.index_of("verify").unwrap());
        let team = v.get(vectorizer.index_of("team").unwrap());
        let idf_verify = vectorizer.idf()[vectorizer.index_of("verify").unwrap()];
        let idf_team = vectorizer.idf()[vectorizer.index_of("team").unwrap()];
        assert!((verify / team - 2.0 * idf_verify / idf_team).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_vocabulary_is_zero() {
        let vectorizer = fitted();
        let v = vectorizer.transform("completely unrelated words").unwrap();
        assert!(v.is_zero());
        assert_eq!(v.dim(), vectorizer.vocabulary_size());
    }

    #[test]
    fn test_transform_before_fit() {
        let vectorizer = TfIdfVectorizer::new(VectorizerConfig::default()).unwrap();
        assert!(matches!(
            vectorizer.transform("hello"),
            Err(PhishError::EmptyVocabulary(_))
        ));
    }

    #[test]
    fn test_fit_empty_vocabulary() {
        let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig::default()).unwrap();
        assert!(matches!(
            vectorizer.fit(&["the and of", "unique words here"]),
            Err(PhishError::EmptyVocabulary(_))
        ));
        let empty: Vec<String> = Vec::new();
        assert!(vectorizer.fit(&empty).is_err());
    }

    #[test]
    fn test_fit_is_idempotent() {
        let a = fitted();
        let b = fitted();
        assert_eq!(a.to_state(), b.to_state());
    }

    #[test]
    fn test_state_round_trip_keeps_transform() {
        let vectorizer = fitted();
        let restored = TfIdfVectorizer::from_state(vectorizer.to_state()).unwrap();
        let text = "verify the team meeting";
        assert_eq!(
            vectorizer.transform(text).unwrap(),
            restored.transform(text).unwrap()
        );
    }

    #[test]
    fn test_from_state_rejects_inconsistent_state() {
        let mut state = fitted().to_state();
        state.idf.pop();
        assert!(TfIdfVectorizer::from_state(state).is_err());

        let mut state = fitted().to_state();
        state.terms[1] = state.terms[0].clone();
        assert!(TfIdfVectorizer::from_state(state).is_err());
    }

    #[test]
    fn test_config_validation() {
        let bad = VectorizerConfig {
            max_df: 1.5,
            ..Default::default()
        };
        assert!(TfIdfVectorizer::new(bad).is_err());
        let bad = VectorizerConfig {
            min_df: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
