//! Setup module.
//!
//! Brings the catalog index to a searchable state: waits for the search
//! engine, creates the index, loads the catalog and refreshes.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::catalog::read_catalog;
use crate::errors::PipelineError;
use crate::loader::CatalogLoader;
use crate::readiness::{wait_until_ready, ReadinessConfig};
use catalog_search_repository::{BulkSummary, SearchEngineClient};

/// Default location of the product catalog.
pub const DEFAULT_CATALOG_PATH: &str = "data/catalog_products.xml";

/// Configuration for the setup pipeline.
#[derive(Debug, Clone)]
pub struct SetupConfig {
    /// Path of the XML catalog to load.
    pub catalog_path: PathBuf,
    /// How long to wait for the search engine.
    pub readiness: ReadinessConfig,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            readiness: ReadinessConfig::default(),
        }
    }
}

/// Outcome of a successful setup.
#[derive(Debug, Clone)]
pub struct SetupReport {
    /// Attempt on which the search engine answered.
    pub ready_after_attempts: u32,
    /// Outcome of the catalog load.
    pub load: BulkSummary,
}

/// Runs the setup steps in order, stopping at the first failure.
pub struct Setup {
    client: Arc<dyn SearchEngineClient>,
    config: SetupConfig,
}

impl Setup {
    /// Create a new setup pipeline.
    pub fn new(client: Arc<dyn SearchEngineClient>, config: SetupConfig) -> Self {
        Self { client, config }
    }

    /// Run the setup pipeline.
    #[instrument(skip(self), fields(index = %self.client.index_name()))]
    pub async fn run(&self) -> Result<SetupReport, PipelineError> {
        info!("Starting catalog index setup");

        let ready_after_attempts =
            wait_until_ready(self.client.as_ref(), &self.config.readiness).await?;

        self.client.ensure_index_exists().await?;

        let products = read_catalog(&self.config.catalog_path).await?;

        let loader = CatalogLoader::new(Arc::clone(&self.client));
        let load = loader.load(&products).await?;

        info!(
            indexed = load.succeeded,
            failed = load.failed,
            "Catalog index setup complete"
        );

        Ok(SetupReport {
            ready_after_attempts,
            load,
        })
    }
}
