//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesRefreshParts},
    BulkParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::SearchIndexConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use crate::opensearch::queries::build_search_query;
use crate::types::{BulkItemFailure, BulkSummary};
use catalog_search_shared::{ProductDocument, SearchHit, SearchQuery};

/// Error type OpenSearch reports when creating an index that already exists.
const INDEX_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// OpenSearch client implementation.
///
/// Provides catalog indexing and prefix search using OpenSearch as the backend.
///
/// # Example
///
/// ```ignore
/// use catalog_search_repository::{IndexConfig, OpenSearchClient, SearchIndexConfig};
/// let client = OpenSearchClient::new(
///     "http://localhost:9200",
///     IndexConfig::default(),
///     SearchIndexConfig::default(),
/// )?;
///
/// client.ensure_index_exists().await?;
/// let summary = client.bulk_index(&documents).await?;
/// client.refresh().await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index_config: IndexConfig,
    config: SearchIndexConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// No request is made here; use `ping` to check the server is up.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index this client operates on
    /// * `config` - Bulk request limits
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If the URL is invalid or the transport cannot be built
    pub fn new(
        url: &str,
        index_config: IndexConfig,
        config: SearchIndexConfig,
    ) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url)
            .map_err(|e| SearchError::connection(format!("Invalid URL {}: {}", url, e)))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index = %index_config.name,
            max_batch_size = ?config.max_batch_size,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index_config,
            config,
        })
    }

    /// Send one bulk request and summarize its per-document outcome.
    ///
    /// `offset` is the position of the chunk's first document in the whole
    /// load; document ids are positions.
    async fn bulk_index_chunk(
        &self,
        documents: &[ProductDocument],
        offset: usize,
    ) -> Result<BulkSummary, SearchError> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);

        for (position, doc) in (offset..).zip(documents) {
            body.push(
                json!({"index": {"_index": self.index_config.name, "_id": position.to_string()}})
                    .into(),
            );
            let source = serde_json::to_value(doc)
                .map_err(|e| SearchError::bulk_index(format!("Failed to serialize document: {}", e)))?;
            body.push(source.into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(&self.index_config.name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchError::bulk_index(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(format!("Invalid bulk response: {}", e)))?;

        Ok(Self::parse_bulk_response(&response_body, documents.len()))
    }

    /// Summarize a bulk response for `submitted` documents.
    ///
    /// Items carrying an `index.error` object count as failed; everything
    /// else the engine accepted counts as indexed.
    fn parse_bulk_response(body: &Value, submitted: usize) -> BulkSummary {
        let has_errors = body.get("errors").and_then(Value::as_bool).unwrap_or(false);

        let failures: Vec<BulkItemFailure> = if has_errors {
            body.get("items")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .enumerate()
                        .filter_map(|(position, item)| {
                            let error = item.get("index").and_then(|i| i.get("error"))?;
                            Some(BulkItemFailure {
                                position,
                                reason: Self::error_reason(error),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let failed = failures.len().min(submitted);

        BulkSummary {
            total: submitted,
            succeeded: submitted - failed,
            failed,
            failures,
        }
    }

    /// Human-readable reason from an OpenSearch error object.
    fn error_reason(error: &Value) -> String {
        match (
            error.get("type").and_then(Value::as_str),
            error.get("reason").and_then(Value::as_str),
        ) {
            (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
            (Some(kind), None) => kind.to_string(),
            (None, Some(reason)) => reason.to_string(),
            (None, None) => error.to_string(),
        }
    }

    /// Parse a search hit into a `SearchHit`.
    ///
    /// Returns `None`, with a warning, when the hit has no usable `_source`.
    fn parse_hit(hit: &Value) -> Option<SearchHit> {
        let id = hit.get("_id").and_then(Value::as_str).unwrap_or_default();

        let Some(source) = hit.get("_source") else {
            warn!(id = %id, "Skipping hit without _source");
            return None;
        };
        let document: ProductDocument = match serde_json::from_value(source.clone()) {
            Ok(document) => document,
            Err(e) => {
                warn!(id = %id, error = %e, "Skipping hit with unreadable _source");
                return None;
            }
        };
        let score = hit.get("_score").and_then(Value::as_f64);

        Some(SearchHit { document, score })
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    fn index_name(&self) -> &str {
        &self.index_config.name
    }

    async fn ping(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        debug!(status = %status, "Ping response");
        Ok(status.is_success())
    }

    #[instrument(skip(self), fields(index = %self.index_config.name))]
    async fn ensure_index_exists(&self) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index_config.name))
            .body(get_index_settings())
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            info!("Index created");
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        if status.as_u16() == 400 && error_body.contains(INDEX_EXISTS_ERROR) {
            info!("Index already exists");
            return Ok(());
        }

        error!(status = %status, body = %error_body, "Index creation failed");
        Err(SearchError::index_creation(format!(
            "Index creation failed with status {}: {}",
            status, error_body
        )))
    }

    /// Index documents in chunks of at most `max_batch_size`.
    ///
    /// Chunks are sent in order; the first request-level failure aborts the
    /// remaining chunks.
    #[instrument(skip(self, documents), fields(index = %self.index_config.name, count = documents.len()))]
    async fn bulk_index(&self, documents: &[ProductDocument]) -> Result<BulkSummary, SearchError> {
        let mut summary = BulkSummary::default();
        if documents.is_empty() {
            return Ok(summary);
        }

        let chunk_size = self.config.chunk_size(documents.len());

        for (chunk_index, chunk) in documents.chunks(chunk_size).enumerate() {
            let chunk_summary = self.bulk_index_chunk(chunk, chunk_index * chunk_size).await?;

            if !chunk_summary.is_complete() {
                warn!(
                    chunk = chunk_index,
                    failed = chunk_summary.failed,
                    "Bulk request had rejected documents"
                );
            }
            debug!(chunk = chunk_index, indexed = chunk_summary.succeeded, "Bulk chunk sent");

            summary.merge(chunk_summary, chunk_index * chunk_size);
        }

        Ok(summary)
    }

    async fn refresh(&self) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[&self.index_config.name]))
            .send()
            .await
            .map_err(|e| SearchError::refresh(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchError::refresh(format!(
                "Refresh failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %self.index_config.name, "Index refreshed");
        Ok(())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[&self.index_config.name]))
            .body(build_search_query(query))
            .send()
            .await
            .map_err(|e| SearchError::query(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(format!("Invalid search response: {}", e)))?;

        let hits: Vec<SearchHit> = response_body
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .map(|hits| hits.iter().filter_map(Self::parse_hit).collect())
            .unwrap_or_default();

        debug!(prefix = %query.prefix, count = hits.len(), "Search completed");
        Ok(hits)
    }
}
