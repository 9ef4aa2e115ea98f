//! The fixed analysis pipeline used for email text.

use std::sync::Arc;

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::char_filter::NormalizeCharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{ShingleFilter, StopFilter};
use crate::analysis::tokenizer::RegexTokenizer;
use crate::error::Result;

/// Normalize → `\b\w\w+\b` words → (optional) English stop words → n-grams.
///
/// The same pipeline runs during fit and transform; it is rebuilt from the
/// vectorizer settings when an artifact is loaded.
///
/// ```
/// use phishnot::analysis::analyzer::{Analyzer, EmailAnalyzer};
///
/// let analyzer = EmailAnalyzer::new((1, 2), true).unwrap();
/// let terms = analyzer.terms("Urgent: verify your account NOW").unwrap();
/// assert_eq!(
///     terms,
///     vec!["urgent", "verify", "account", "urgent verify", "verify account"]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct EmailAnalyzer {
    inner: PipelineAnalyzer,
}

impl EmailAnalyzer {
    /// Build the pipeline for the given n-gram range.
    pub fn new(ngram_range: (usize, usize), stop_words: bool) -> Result<Self> {
        let mut inner = PipelineAnalyzer::new(Arc::new(RegexTokenizer::new()?))
            .add_char_filter(Arc::new(NormalizeCharFilter));
        if stop_words {
            inner = inner.add_filter(Arc::new(StopFilter::new()));
        }
        inner = inner
            .add_filter(Arc::new(ShingleFilter::new(ngram_range.0, ngram_range.1)?))
            .with_name("email");

        Ok(EmailAnalyzer { inner })
    }
}

impl Analyzer for EmailAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_stop_words() {
        let analyzer = EmailAnalyzer::new((1, 1), false).unwrap();
        assert_eq!(
            analyzer.terms("Thanks for subscribing").unwrap(),
            vec!["thanks", "for", "subscribing"]
        );
    }

    #[test]
    fn test_bigrams_skip_stop_words() {
        let analyzer = EmailAnalyzer::new((1, 2), true).unwrap();
        let terms = analyzer
            .terms("Thanks for subscribing to our newsletter.")
            .unwrap();
        assert_eq!(
            terms,
            vec![
                "thanks",
                "subscribing",
                "newsletter",
                "thanks subscribing",
                "subscribing newsletter"
            ]
        );
    }

    #[test]
    fn test_blank_text() {
        let analyzer = EmailAnalyzer::new((1, 2), true).unwrap();
        assert!(analyzer.terms("   ").unwrap().is_empty());
        assert_eq!(analyzer.name(), "email");
    }
}
