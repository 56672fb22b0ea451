//! Loader module for the setup pipeline.
//!
//! Loads catalog products into the search index.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::errors::PipelineError;
use catalog_search_repository::{BulkSummary, SearchEngineClient};
use catalog_search_shared::ProductDocument;

/// Number of rejected documents logged individually.
const MAX_LOGGED_FAILURES: usize = 10;

/// Loader that indexes catalog products into the search engine.
///
/// The loader is responsible for:
/// - Sending the products as bulk requests
/// - Reporting documents the engine rejected
/// - Refreshing the index so the products become searchable
pub struct CatalogLoader {
    client: Arc<dyn SearchEngineClient>,
}

impl CatalogLoader {
    /// Create a new catalog loader with the given client.
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self { client }
    }

    /// Index the products and refresh the index.
    ///
    /// Rejected documents are logged and counted, but only a load in which
    /// nothing was indexed is an error. A failed refresh is logged and
    /// otherwise ignored.
    #[instrument(skip(self, documents), fields(index = %self.client.index_name(), count = documents.len()))]
    pub async fn load(&self, documents: &[ProductDocument]) -> Result<BulkSummary, PipelineError> {
        if documents.is_empty() {
            return Err(PipelineError::loader("No documents to load"));
        }

        let summary = self.client.bulk_index(documents).await?;

        for failure in summary.failures.iter().take(MAX_LOGGED_FAILURES) {
            warn!(
                position = failure.position,
                reason = %failure.reason,
                "Document rejected by search engine"
            );
        }
        if summary.failures.len() > MAX_LOGGED_FAILURES {
            warn!(
                omitted = summary.failures.len() - MAX_LOGGED_FAILURES,
                "More documents were rejected"
            );
        }

        if summary.succeeded == 0 {
            return Err(PipelineError::loader(format!(
                "All {} documents were rejected",
                summary.total
            )));
        }

        info!(
            indexed = summary.succeeded,
            failed = summary.failed,
            "Loaded products into index"
        );

        match self.client.refresh().await {
            Ok(()) => info!("Index refreshed"),
            Err(e) => warn!(error = %e, "Failed to refresh index"),
        }

        Ok(summary)
    }
}
