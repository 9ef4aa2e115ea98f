//! Word n-gram (shingle) construction.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::{PhishError, Result};

/// Emits word n-grams for every `n` in `min_size..=max_size`.
///
/// All n-grams of one size are emitted before the next size, in text order,
/// with words joined by a single space. Unigrams pass through unchanged.
///
/// ```
/// use phishnot::analysis::token_filter::{Filter, ShingleFilter};
/// use phishnot::analysis::token::Token;
///
/// let filter = ShingleFilter::new(1, 2).unwrap();
/// let tokens = vec![Token::new("verify", 0), Token::new("account", 1)];
/// let texts: Vec<_> = filter
///     .filter(Box::new(tokens.into_iter()))
///     .unwrap()
///     .map(|t| t.text)
///     .collect();
///
/// assert_eq!(texts, vec!["verify", "account", "verify account"]);
/// ```
#[derive(Clone, Debug)]
pub struct ShingleFilter {
    min_size: usize,
    max_size: usize,
}

impl ShingleFilter {
    /// Create a shingle filter for the inclusive size range.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self> {
        if min_size == 0 || min_size > max_size {
            return Err(PhishError::config(format!(
                "Invalid n-gram range ({min_size}, {max_size})"
            )));
        }
        Ok(ShingleFilter { min_size, max_size })
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Filter for ShingleFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words: Vec<Token> = tokens.collect();
        let mut shingles = Vec::new();

        for n in self.min_size..=self.max_size {
            if n > words.len() {
                break;
            }
            if n == 1 {
                shingles.extend(words.iter().cloned());
                continue;
            }
            for window in words.windows(n) {
                let text = window
                    .iter()
                    .map(|token| token.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                shingles.push(
                    Token::with_offsets(
                        text,
                        window[0].position,
                        window[0].start_offset,
                        window[n - 1].end_offset,
                    )
                    .with_position_length(n),
                );
            }
        }

        Ok(Box::new(shingles.into_iter()))
    }

    fn name(&self) -> &'static str {
        "shingle"
    }
}
