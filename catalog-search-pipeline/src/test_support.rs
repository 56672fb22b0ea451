//! In-memory search engine used by the pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use catalog_search_repository::{BulkItemFailure, BulkSummary, SearchEngineClient, SearchError};
use catalog_search_shared::{ProductDocument, SearchHit, SearchQuery};

/// Scriptable `SearchEngineClient`.
///
/// Pings answer from the scripted queue, then `Ok(true)` once it is empty.
/// Every call is recorded in order so tests can check sequencing.
#[derive(Default)]
pub(crate) struct MockSearchEngine {
    pings: Mutex<VecDeque<Result<bool, SearchError>>>,
    ping_count: AtomicU32,
    index_error: Option<SearchError>,
    bulk_error: Option<SearchError>,
    refresh_error: Option<SearchError>,
    rejected_positions: Vec<usize>,
    hits: HashMap<String, Vec<SearchHit>>,
    failing_prefixes: Vec<String>,
    calls: Mutex<Vec<String>>,
    indexed: Mutex<Vec<ProductDocument>>,
    searches: Mutex<Vec<SearchQuery>>,
}

impl MockSearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pings(self, pings: Vec<Result<bool, SearchError>>) -> Self {
        *self.pings.lock().unwrap() = pings.into();
        self
    }

    pub fn with_index_error(mut self, error: SearchError) -> Self {
        self.index_error = Some(error);
        self
    }

    pub fn with_bulk_error(mut self, error: SearchError) -> Self {
        self.bulk_error = Some(error);
        self
    }

    pub fn with_refresh_error(mut self, error: SearchError) -> Self {
        self.refresh_error = Some(error);
        self
    }

    pub fn rejecting(mut self, positions: Vec<usize>) -> Self {
        self.rejected_positions = positions;
        self
    }

    pub fn with_hits(mut self, prefix: &str, hits: Vec<SearchHit>) -> Self {
        self.hits.insert(prefix.to_string(), hits);
        self
    }

    pub fn failing_on(mut self, prefix: &str) -> Self {
        self.failing_prefixes.push(prefix.to_string());
        self
    }

    pub fn ping_count(&self) -> u32 {
        self.ping_count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn indexed(&self) -> Vec<ProductDocument> {
        self.indexed.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<SearchQuery> {
        self.searches.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

/// Hit with the given name and score.
pub(crate) fn hit(name: &str, score: f64) -> SearchHit {
    SearchHit {
        document: ProductDocument::new().with_name(name),
        score: Some(score),
    }
}

#[async_trait]
impl SearchEngineClient for MockSearchEngine {
    fn index_name(&self) -> &str {
        "catalog_products"
    }

    async fn ping(&self) -> Result<bool, SearchError> {
        self.ping_count.fetch_add(1, Ordering::SeqCst);
        self.record("ping");
        self.pings.lock().unwrap().pop_front().unwrap_or(Ok(true))
    }

    async fn ensure_index_exists(&self) -> Result<(), SearchError> {
        self.record("ensure_index_exists");
        match &self.index_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn bulk_index(&self, documents: &[ProductDocument]) -> Result<BulkSummary, SearchError> {
        self.record("bulk_index");
        if let Some(e) = &self.bulk_error {
            return Err(e.clone());
        }

        let failures: Vec<BulkItemFailure> = self
            .rejected_positions
            .iter()
            .filter(|position| **position < documents.len())
            .map(|position| BulkItemFailure {
                position: *position,
                reason: "mapper_parsing_exception".to_string(),
            })
            .collect();

        self.indexed.lock().unwrap().extend(
            documents
                .iter()
                .enumerate()
                .filter(|(position, _)| !self.rejected_positions.contains(position))
                .map(|(_, doc)| doc.clone()),
        );

        Ok(BulkSummary {
            total: documents.len(),
            succeeded: documents.len() - failures.len(),
            failed: failures.len(),
            failures,
        })
    }

    async fn refresh(&self) -> Result<(), SearchError> {
        self.record("refresh");
        match &self.refresh_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
        self.record("search");
        self.searches.lock().unwrap().push(query.clone());

        if self.failing_prefixes.contains(&query.prefix) {
            return Err(SearchError::query("search failed with status 500"));
        }

        Ok(self
            .hits
            .get(&query.prefix)
            .map(|hits| hits.iter().take(query.top_k).cloned().collect())
            .unwrap_or_default())
    }
}
