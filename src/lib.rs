//! USAN stem analysis of clinical-trial interventions
//!
//! Matches free-text intervention names to a drug vocabulary, classifies the
//! matched drugs by their USAN naming stems, attaches trials to each class and
//! counts how often pairs of classes are tested together.

pub mod models;
pub mod errors;
pub mod stopwords;
pub mod parser;
pub mod matcher;
pub mod classifier;
pub mod associator;
pub mod aggregator;
pub mod output;
pub mod pipeline;
pub mod example_data;

pub use models::*;
pub use errors::*;
pub use pipeline::{Pipeline, PipelineInputs};

/// Re-export commonly used types
pub type Result<T> = std::result::Result<T, UsanError>;
