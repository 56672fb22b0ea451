//! # Catalog Search Pipeline
//!
//! This crate provides the two pipelines run against the catalog index.
//!
//! ## Setup
//!
//! 1. **Readiness**: Waits until the search engine answers
//! 2. **Index**: Creates the catalog index with its analyzers and mappings
//! 3. **Catalog**: Reads products from the XML catalog
//! 4. **Loader**: Bulk-loads the products and refreshes the index
//!
//! ## Evaluation
//!
//! Runs every prefix query from a CSV file against the index and writes the
//! top hits and latency of each to a report CSV.

pub mod catalog;
pub mod errors;
pub mod evaluation;
pub mod loader;
pub mod readiness;
pub mod setup;

#[cfg(test)]
mod test_support;

pub use catalog::{parse_catalog, read_catalog, CatalogError};
pub use errors::PipelineError;
pub use evaluation::{EvaluationSummary, Evaluator};
pub use loader::CatalogLoader;
pub use readiness::{wait_until_ready, ReadinessConfig};
pub use setup::{Setup, SetupConfig, SetupReport};
