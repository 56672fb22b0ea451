//! # Catalog Search Repository
//!
//! This crate provides the interface for talking to the search engine that
//! backs the product catalog, along with its OpenSearch implementation: index
//! settings and mappings, the prefix query builder, bulk loading and search.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::SearchIndexConfig;
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use opensearch::{IndexConfig, OpenSearchClient};
pub use types::{BulkItemFailure, BulkSummary};
