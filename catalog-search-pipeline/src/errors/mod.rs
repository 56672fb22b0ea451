//! Error types for the catalog search pipelines.

use catalog_search_repository::SearchError;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors that can occur while running setup or evaluation.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The search engine did not answer in time.
    #[error("Search engine not available after {attempts} attempts")]
    NotReady { attempts: u32 },

    /// Error from the search engine.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// Error reading the product catalog.
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),

    /// Error from the loader component.
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// Error from the evaluation component.
    #[error("Evaluation error: {0}")]
    EvaluationError(String),

    /// Error reading or writing CSV.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }

    /// Create an evaluation error.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::EvaluationError(msg.into())
    }
}
