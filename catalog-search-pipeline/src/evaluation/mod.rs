//! Evaluation module.
//!
//! Runs a set of prefix queries against the catalog index and writes a report
//! with the top hits and latency of each, ready for manual judgement.

mod report;

pub use report::{
    format_latency, format_names, format_scores, EvaluationRow, EvaluationSummary, LatencyStats,
    PrefixQuery, REPORT_HEADERS,
};

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, instrument};

use crate::errors::PipelineError;
use catalog_search_repository::SearchEngineClient;
use catalog_search_shared::SearchQuery;

/// Number of hits recorded per query.
pub const EVALUATION_TOP_K: usize = 3;

/// Default location of the prefix queries file.
pub const DEFAULT_QUERIES_PATH: &str = "data/prefix_queries.csv";

/// Default location of the evaluation report.
pub const DEFAULT_REPORT_PATH: &str = "reports/elasticsearch_evaluation_results.csv";

/// Parse prefix queries from CSV with a `query,site,type,notes` header.
pub fn read_queries<R: Read>(input: R) -> Result<Vec<PrefixQuery>, PipelineError> {
    let queries: Vec<PrefixQuery> = csv::Reader::from_reader(input)
        .deserialize()
        .collect::<Result<_, _>>()?;
    Ok(queries)
}

/// Runs prefix queries and records their results.
pub struct Evaluator {
    client: Arc<dyn SearchEngineClient>,
    top_k: usize,
}

impl Evaluator {
    /// Create an evaluator recording the top 3 hits per query.
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self {
            client,
            top_k: EVALUATION_TOP_K,
        }
    }

    /// Evaluate the queries in `queries_path` and write the report to `output_path`.
    ///
    /// The queries are parsed before the report is opened, so a bad queries
    /// file leaves an existing report untouched. The report's parent
    /// directory is created if needed.
    #[instrument(skip(self), fields(index = %self.client.index_name()))]
    pub async fn run(
        &self,
        queries_path: &Path,
        output_path: &Path,
    ) -> Result<EvaluationSummary, PipelineError> {
        info!("Starting evaluation");

        let input = tokio::fs::read(queries_path).await.map_err(|e| {
            PipelineError::evaluation(format!(
                "Failed to open queries file {}: {}",
                queries_path.display(),
                e
            ))
        })?;
        let queries = read_queries(input.as_slice())?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let output = File::create(output_path)?;

        let summary = self.evaluate_queries(&queries, output).await?;

        info!(
            queries = summary.queries,
            zero_results = summary.zero_results,
            failed_searches = summary.failed_searches,
            mean_latency_ms = summary.latency.mean,
            p50_latency_ms = summary.latency.p50,
            p95_latency_ms = summary.latency.p95,
            min_latency_ms = summary.latency.min,
            max_latency_ms = summary.latency.max,
            report = %output_path.display(),
            "Evaluation complete"
        );

        Ok(summary)
    }

    /// Evaluate queries read from `input` as CSV and write report rows to `output`.
    ///
    /// All queries are read before the first search, so a malformed file
    /// fails before anything is written.
    pub async fn evaluate<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<EvaluationSummary, PipelineError> {
        let queries = read_queries(input)?;
        self.evaluate_queries(&queries, output).await
    }

    /// Search every query in order and write one report row each.
    ///
    /// A failed search is logged and recorded as a query without hits.
    pub async fn evaluate_queries<W: Write>(
        &self,
        queries: &[PrefixQuery],
        output: W,
    ) -> Result<EvaluationSummary, PipelineError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(output);
        writer.write_record(REPORT_HEADERS)?;

        let mut latencies = Vec::with_capacity(queries.len());
        let mut zero_results = 0;
        let mut failed_searches = 0;

        for query in queries {
            let search = SearchQuery::new(query.query.as_str()).with_top_k(self.top_k);

            let start = Instant::now();
            let result = self.client.search(&search).await;
            let latency = start.elapsed();

            let hits = match result {
                Ok(hits) => hits,
                Err(e) => {
                    error!(prefix = %query.query, error = %e, "Search failed");
                    failed_searches += 1;
                    Vec::new()
                }
            };

            debug!(
                prefix = %query.query,
                hits = hits.len(),
                top_score = ?hits.first().and_then(|h| h.score),
                "Query evaluated"
            );
            if hits.is_empty() {
                zero_results += 1;
            }
            latencies.push(latency.as_secs_f64() * 1000.0);

            writer.serialize(EvaluationRow::new(query, &hits, latency))?;
        }

        writer.flush()?;

        Ok(EvaluationSummary {
            queries: queries.len(),
            zero_results,
            failed_searches,
            latency: LatencyStats::from_latencies(&latencies),
        })
    }
}
