//! Machine learning components for PhishNot.
//!
//! TF-IDF feature extraction, the logistic regression classifier,
//! evaluation metrics and train/test splitting.

pub mod classifier;
pub mod features;
pub mod metrics;
pub mod model_selection;
pub mod vectorizer;

pub use classifier::*;
pub use features::*;
pub use metrics::*;
pub use model_selection::*;
pub use vectorizer::*;
