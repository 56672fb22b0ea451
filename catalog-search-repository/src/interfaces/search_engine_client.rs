//! Search engine client trait definition.
//!
//! This module defines the abstract interface for catalog index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::BulkSummary;
use catalog_search_shared::{ProductDocument, SearchHit, SearchQuery};

/// Abstract interface for search engine operations.
///
/// Setup and evaluation only depend on this trait, so tests can drive them
/// with in-memory implementations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Name of the index this client operates on.
    fn index_name(&self) -> &str;

    /// Check if the search engine answers.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The engine answered with a success status
    /// * `Ok(false)` - The engine answered with any other status
    /// * `Err(SearchError)` - The engine could not be reached
    async fn ping(&self) -> Result<bool, SearchError>;

    /// Ensure the catalog index exists with its analyzers and mappings.
    ///
    /// An index that already exists is left untouched and counts as success.
    async fn ensure_index_exists(&self) -> Result<(), SearchError>;

    /// Index documents using bulk requests.
    ///
    /// Each document is identified by its position in `documents`, so
    /// loading the same catalog again overwrites instead of duplicating.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkSummary)` - Per-document outcome of the accepted requests
    /// * `Err(SearchError::BulkIndexError)` - If a bulk request itself failed
    async fn bulk_index(&self, documents: &[ProductDocument]) -> Result<BulkSummary, SearchError>;

    /// Make recently indexed documents visible to search.
    async fn refresh(&self) -> Result<(), SearchError>;

    /// Execute a prefix search against the index.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let hits = client.search(&SearchQuery::new("ма").with_top_k(3)).await?;
    /// for hit in hits {
    ///     println!("{}", hit.display_name());
    /// }
    /// ```
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError>;
}
