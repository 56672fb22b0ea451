//! Result types for bulk operations.

/// A document that the search engine refused during a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemFailure {
    /// Position of the document in the submitted slice.
    pub position: usize,
    /// Reason reported by the search engine.
    pub reason: String,
}

/// Summary of a bulk operation.
///
/// Request-level failures are reported as errors; this summary only covers
/// the per-document outcome of requests the engine accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSummary {
    /// Number of documents submitted.
    pub total: usize,
    /// Number of documents indexed.
    pub succeeded: usize,
    /// Number of documents rejected.
    pub failed: usize,
    /// Details of each rejected document.
    pub failures: Vec<BulkItemFailure>,
}

impl BulkSummary {
    /// Fold the summary of a later chunk into this one.
    ///
    /// `offset` is the position of the chunk's first document in the full slice.
    pub fn merge(&mut self, other: BulkSummary, offset: usize) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.failures
            .extend(other.failures.into_iter().map(|failure| BulkItemFailure {
                position: failure.position + offset,
                reason: failure.reason,
            }));
    }

    /// Check whether every submitted document was indexed.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}
