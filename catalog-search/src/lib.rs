//! # Catalog Search
//!
//! Entry point of the catalog search container.
//!
//! This crate provides the configuration, dependency wiring and the step
//! launcher that runs index setup followed by the prefix search evaluation.

pub mod cli;
pub mod config;
pub mod launcher;

pub use config::{AppConfig, Dependencies};
pub use launcher::{ChainOutcome, Step, StepChain};

use thiserror::Error;

/// Errors that can occur while configuring or running a command.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] catalog_search_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] catalog_search_repository::SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
