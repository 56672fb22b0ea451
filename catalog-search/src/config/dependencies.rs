//! Dependency initialization and wiring.

use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::AppError;
use catalog_search_repository::{IndexConfig, OpenSearchClient, SearchEngineClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Client for the catalog index.
    pub search_client: Arc<dyn SearchEngineClient>,
}

impl Dependencies {
    /// Initialize all dependencies from the resolved configuration.
    ///
    /// No request is sent to the search engine here: setup waits for it to
    /// come up, and evaluation assumes setup already did.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If initialization fails
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        info!(
            opensearch_url = %config.opensearch_url,
            index = %config.index_name,
            "Initializing dependencies"
        );

        let search_client = OpenSearchClient::new(
            &config.opensearch_url,
            IndexConfig::new(config.index_name.clone()),
            config.search_index_config(),
        )
        .map_err(|e| AppError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        Ok(Self {
            search_client: Arc::new(search_client),
        })
    }
}
