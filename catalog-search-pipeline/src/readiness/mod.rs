//! Readiness module for the setup pipeline.
//!
//! Blocks until the search engine answers, so nothing downstream races its
//! startup.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

use crate::errors::PipelineError;
use catalog_search_repository::SearchEngineClient;

/// Default number of attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;

/// Default pause between attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for the readiness wait.
#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    /// Number of pings before giving up.
    pub max_attempts: u32,
    /// Pause between two pings.
    pub interval: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl ReadinessConfig {
    /// Create a config with the given attempt count and interval.
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Longest time the wait can take, ignoring ping latency.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Ping the search engine until it answers with a success status.
///
/// Unreachable and unhealthy responses both count as "not ready yet".
///
/// # Returns
///
/// * `Ok(attempt)` - The 1-based attempt on which the engine answered
/// * `Err(PipelineError::NotReady)` - If every attempt failed
#[instrument(skip(client, config), fields(max_attempts = config.max_attempts))]
pub async fn wait_until_ready(
    client: &dyn SearchEngineClient,
    config: &ReadinessConfig,
) -> Result<u32, PipelineError> {
    info!(
        max_wait_secs = config.max_wait().as_secs(),
        "Waiting for search engine"
    );

    for attempt in 1..=config.max_attempts {
        match client.ping().await {
            Ok(true) => {
                info!(attempt, "Search engine is available");
                return Ok(attempt);
            }
            Ok(false) => debug!(attempt, "Search engine answered but is not ready"),
            Err(e) => debug!(attempt, error = %e, "Search engine unreachable"),
        }

        if attempt < config.max_attempts {
            sleep(config.interval).await;
        }
    }

    error!("Search engine did not become available in time");
    Err(PipelineError::NotReady {
        attempts: config.max_attempts,
    })
}
