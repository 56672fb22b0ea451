//! Search query and hit types.

use serde::{Deserialize, Serialize};

use crate::ProductDocument;

/// Number of hits returned when the caller does not ask for a specific count.
pub const DEFAULT_TOP_K: usize = 10;

/// Placeholder used when a hit has no name.
pub const UNKNOWN_NAME: &str = "unknown_name";

/// A prefix search against the catalog index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The text typed so far.
    pub prefix: String,
    /// Maximum number of hits to return.
    pub top_k: usize,
}

impl SearchQuery {
    /// Create a query returning the default number of hits.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the maximum number of hits.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The stored product (restricted to the requested source fields).
    pub document: ProductDocument,
    /// Relevance score, if the engine reported one.
    pub score: Option<f64>,
}

impl SearchHit {
    /// Name used to identify the hit in reports.
    pub fn display_name(&self) -> &str {
        self.document.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }
}
