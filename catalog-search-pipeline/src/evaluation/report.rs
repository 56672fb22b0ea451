//! Evaluation report rows and summary statistics.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use catalog_search_shared::SearchHit;

/// Column order of the evaluation report.
pub const REPORT_HEADERS: [&str; 8] = [
    "query",
    "site",
    "type",
    "notes",
    "top_3",
    "top_3_score",
    "latency_ms",
    "judgement",
];

/// Separator between hits in the `top_3` and `top_3_score` columns.
const HIT_SEPARATOR: &str = "|";

/// A row of the prefix queries file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrefixQuery {
    /// The prefix to search for.
    pub query: String,
    /// Site the prefix was collected from.
    pub site: String,
    /// Kind of query (e.g. prefix, typo, brand).
    #[serde(rename = "type")]
    pub query_type: String,
    /// Free-form notes.
    pub notes: String,
}

/// A row of the evaluation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationRow {
    pub query: String,
    pub site: String,
    #[serde(rename = "type")]
    pub query_type: String,
    pub notes: String,
    pub top_3: String,
    pub top_3_score: String,
    pub latency_ms: String,
    /// Left empty for manual relevance judgement.
    pub judgement: String,
}

impl EvaluationRow {
    /// Build the report row for a query, its hits and the search latency.
    pub fn new(query: &PrefixQuery, hits: &[SearchHit], latency: Duration) -> Self {
        Self {
            query: query.query.clone(),
            site: query.site.clone(),
            query_type: query.query_type.clone(),
            notes: query.notes.clone(),
            top_3: format_names(hits),
            top_3_score: format_scores(hits),
            latency_ms: format_latency(latency),
            judgement: String::new(),
        }
    }
}

/// Hit names joined by `|`.
pub fn format_names(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(SearchHit::display_name)
        .collect::<Vec<_>>()
        .join(HIT_SEPARATOR)
}

/// One empty slot per hit, joined by `|`.
///
/// Scores are left for the reviewer to fill in, so the column only keeps
/// the slot layout of `top_3`.
pub fn format_scores(hits: &[SearchHit]) -> String {
    vec![""; hits.len()].join(HIT_SEPARATOR)
}

/// Latency in milliseconds with two decimals.
pub fn format_latency(latency: Duration) -> String {
    format!("{:.2}", latency.as_secs_f64() * 1000.0)
}

/// Latency statistics in milliseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatencyStats {
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub min: f64,
    pub max: f64,
}

impl LatencyStats {
    /// Compute statistics over a set of latencies.
    pub fn from_latencies(latencies: &[f64]) -> Self {
        if latencies.is_empty() {
            return Self::default();
        }

        let mut sorted = latencies.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let sum: f64 = sorted.iter().sum();

        Self {
            mean: sum / sorted.len() as f64,
            p50: percentile(&sorted, 0.5),
            p95: percentile(&sorted, 0.95),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        }
    }
}

/// Nearest-rank percentile of sorted values.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((sorted.len() as f64 * p).ceil() as usize).max(1) - 1;
    sorted[index.min(sorted.len() - 1)]
}

/// Outcome of an evaluation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationSummary {
    /// Number of queries evaluated.
    pub queries: usize,
    /// Queries that returned no hits (including failed searches).
    pub zero_results: usize,
    /// Searches that failed and were reported as empty.
    pub failed_searches: usize,
    /// Search latency statistics.
    pub latency: LatencyStats,
}
