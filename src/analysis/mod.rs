//! Text analysis module for PhishNot.
//!
//! Turns raw email text into the unigram and bigram terms counted by the
//! vectorizer: normalization, word tokenization, stop-word removal and
//! n-gram construction, composed as a pipeline.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::*;
pub use char_filter::*;
pub use token::*;
pub use token_filter::*;
pub use tokenizer::*;
