//! Analyzer implementations that combine tokenizers and filters.

mod analyzer;
mod email;
mod pipeline;

pub use analyzer::Analyzer;
pub use email::EmailAnalyzer;
pub use pipeline::PipelineAnalyzer;
