//! Configuration types for the search engine client.

/// Default number of documents sent in one bulk request.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Configuration for bulk operations against the index.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Maximum number of documents sent in a single bulk request.
    /// Set to None to send everything in one request.
    pub max_batch_size: Option<usize>,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(DEFAULT_MAX_BATCH_SIZE),
        }
    }
}

impl SearchIndexConfig {
    /// Create a config with no batch size limit.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }

    /// Create a config with a custom batch size limit.
    ///
    /// A limit of zero is treated as one document per request.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size.max(1)),
        }
    }

    /// Chunk size to use for `total` documents.
    pub fn chunk_size(&self, total: usize) -> usize {
        self.max_batch_size.unwrap_or(total).max(1)
    }
}
