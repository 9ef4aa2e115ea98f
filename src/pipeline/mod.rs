//! Training and serving orchestration.
//!
//! [`TrainingPipeline`] turns a labeled corpus into a persisted artifact
//! pair; [`ServingPipeline`] loads that pair and classifies emails.

pub mod serving;
pub mod training;

pub use serving::*;
pub use training::*;
