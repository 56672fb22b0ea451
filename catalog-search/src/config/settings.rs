//! Settings resolved from the environment and command line.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cli::GlobalArgs;
use crate::AppError;
use catalog_search_pipeline::evaluation::{DEFAULT_QUERIES_PATH, DEFAULT_REPORT_PATH};
use catalog_search_pipeline::readiness::{DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS};
use catalog_search_pipeline::setup::DEFAULT_CATALOG_PATH;
use catalog_search_pipeline::{ReadinessConfig, SetupConfig};
use catalog_search_repository::config::DEFAULT_MAX_BATCH_SIZE;
use catalog_search_repository::opensearch::DEFAULT_INDEX_NAME;
use catalog_search_repository::SearchIndexConfig;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

const OPENSEARCH_URL: &str = "OPENSEARCH_URL";
const OPENSEARCH_INDEX: &str = "OPENSEARCH_INDEX";
const CATALOG_PATH: &str = "CATALOG_PATH";
const QUERIES_PATH: &str = "QUERIES_PATH";
const REPORT_PATH: &str = "REPORT_PATH";
const READY_MAX_ATTEMPTS: &str = "READY_MAX_ATTEMPTS";
const READY_INTERVAL_SECS: &str = "READY_INTERVAL_SECS";
const BULK_BATCH_SIZE: &str = "BULK_BATCH_SIZE";
const LOG_FORMAT: &str = "LOG_FORMAT";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::config(format!(
                "{} must be 'text' or 'json', got '{}'",
                LOG_FORMAT, other
            ))),
        }
    }
}

/// Resolved configuration shared by all commands.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub opensearch_url: String,
    pub index_name: String,
    pub catalog_path: PathBuf,
    pub queries_path: PathBuf,
    pub report_path: PathBuf,
    pub ready_attempts: u32,
    pub ready_interval_secs: u64,
    pub batch_size: usize,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            opensearch_url: DEFAULT_OPENSEARCH_URL.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            queries_path: PathBuf::from(DEFAULT_QUERIES_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            ready_attempts: DEFAULT_MAX_ATTEMPTS,
            ready_interval_secs: DEFAULT_INTERVAL.as_secs(),
            batch_size: DEFAULT_MAX_BATCH_SIZE,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_INDEX`: Catalog index name (default: catalog_products)
    /// - `CATALOG_PATH`: XML catalog (default: data/catalog_products.xml)
    /// - `QUERIES_PATH`: Prefix queries CSV (default: data/prefix_queries.csv)
    /// - `REPORT_PATH`: Evaluation report (default: reports/elasticsearch_evaluation_results.csv)
    /// - `READY_MAX_ATTEMPTS`: Readiness attempts (default: 120)
    /// - `READY_INTERVAL_SECS`: Seconds between readiness attempts (default: 5)
    /// - `BULK_BATCH_SIZE`: Documents per bulk request (default: 1000)
    /// - `LOG_FORMAT`: `text` or `json` (default: text)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults for
    /// unset or empty variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            opensearch_url: get(OPENSEARCH_URL).unwrap_or(defaults.opensearch_url),
            index_name: get(OPENSEARCH_INDEX).unwrap_or(defaults.index_name),
            catalog_path: get(CATALOG_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_path),
            queries_path: get(QUERIES_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.queries_path),
            report_path: get(REPORT_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.report_path),
            ready_attempts: parse_var(READY_MAX_ATTEMPTS, get(READY_MAX_ATTEMPTS))?
                .unwrap_or(defaults.ready_attempts),
            ready_interval_secs: parse_var(READY_INTERVAL_SECS, get(READY_INTERVAL_SECS))?
                .unwrap_or(defaults.ready_interval_secs),
            batch_size: parse_var(BULK_BATCH_SIZE, get(BULK_BATCH_SIZE))?
                .unwrap_or(defaults.batch_size),
            log_format: get(LOG_FORMAT)
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.log_format),
        })
    }

    /// Apply command line options on top of the environment.
    pub fn apply_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(url) = &args.opensearch_url {
            self.opensearch_url = url.clone();
        }
        if let Some(index) = &args.index_name {
            self.index_name = index.clone();
        }
        if let Some(path) = &args.catalog_path {
            self.catalog_path = path.clone();
        }
        if let Some(path) = &args.queries_path {
            self.queries_path = path.clone();
        }
        if let Some(path) = &args.report_path {
            self.report_path = path.clone();
        }
        if let Some(attempts) = args.ready_attempts {
            self.ready_attempts = attempts;
        }
        if let Some(secs) = args.ready_interval_secs {
            self.ready_interval_secs = secs;
        }
        if let Some(size) = args.batch_size {
            self.batch_size = size;
        }
        self
    }

    pub fn readiness(&self) -> ReadinessConfig {
        ReadinessConfig::new(
            self.ready_attempts,
            Duration::from_secs(self.ready_interval_secs),
        )
    }

    pub fn setup_config(&self) -> SetupConfig {
        SetupConfig {
            catalog_path: self.catalog_path.clone(),
            readiness: self.readiness(),
        }
    }

    pub fn search_index_config(&self) -> SearchIndexConfig {
        SearchIndexConfig::with_max_batch_size(self.batch_size)
    }

    /// Environment variables that reproduce this configuration in a child process.
    pub fn to_env_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (OPENSEARCH_URL, self.opensearch_url.clone()),
            (OPENSEARCH_INDEX, self.index_name.clone()),
            (CATALOG_PATH, self.catalog_path.display().to_string()),
            (QUERIES_PATH, self.queries_path.display().to_string()),
            (REPORT_PATH, self.report_path.display().to_string()),
            (READY_MAX_ATTEMPTS, self.ready_attempts.to_string()),
            (READY_INTERVAL_SECS, self.ready_interval_secs.to_string()),
            (BULK_BATCH_SIZE, self.batch_size.to_string()),
            (LOG_FORMAT, self.log_format.as_str().to_string()),
        ]
    }
}

fn parse_var<T: FromStr>(key: &str, value: Option<String>) -> Result<Option<T>, AppError> {
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|_| {
                AppError::config(format!("{} must be a non-negative integer, got '{}'", key, v))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.opensearch_url, "http://localhost:9200");
        assert_eq!(config.index_name, "catalog_products");
        assert_eq!(config.catalog_path, PathBuf::from("data/catalog_products.xml"));
        assert_eq!(config.queries_path, PathBuf::from("data/prefix_queries.csv"));
        assert_eq!(
            config.report_path,
            PathBuf::from("reports/elasticsearch_evaluation_results.csv")
        );
        assert_eq!(config.ready_attempts, 120);
        assert_eq!(config.ready_interval_secs, 5);
        assert_eq!(config.batch_size, 1000);
    }

    #[test]
    fn test_reads_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("OPENSEARCH_URL", "http://opensearch:9200"),
            ("OPENSEARCH_INDEX", "products_v2"),
            ("READY_MAX_ATTEMPTS", "3"),
            ("READY_INTERVAL_SECS", " 1 "),
            ("BULK_BATCH_SIZE", "250"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.opensearch_url, "http://opensearch:9200");
        assert_eq!(config.index_name, "products_v2");
        assert_eq!(config.ready_attempts, 3);
        assert_eq!(config.ready_interval_secs, 1);
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.readiness().interval, Duration::from_secs(1));
    }

    #[test]
    fn test_empty_variable_uses_default() {
        let config = AppConfig::from_lookup(lookup(&[("OPENSEARCH_INDEX", "")])).unwrap();
        assert_eq!(config.index_name, "catalog_products");
    }

    #[test]
    fn test_invalid_number_is_error() {
        let result = AppConfig::from_lookup(lookup(&[("READY_MAX_ATTEMPTS", "many")]));
        assert!(matches!(result, Err(AppError::ConfigError(msg)) if msg.contains("READY_MAX_ATTEMPTS")));
    }

    #[test]
    fn test_invalid_log_format_is_error() {
        let result = AppConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = AppConfig::from_lookup(lookup(&[("OPENSEARCH_INDEX", "from_env")]))
            .unwrap()
            .apply_overrides(&GlobalArgs {
                index_name: Some("from_cli".to_string()),
                batch_size: Some(10),
                ..GlobalArgs::default()
            });

        assert_eq!(config.index_name, "from_cli");
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.opensearch_url, "http://localhost:9200");
    }

    #[test]
    fn test_env_pairs_reproduce_config() {
        let config = AppConfig {
            index_name: "forwarded".to_string(),
            ready_attempts: 7,
            log_format: LogFormat::Json,
            ..AppConfig::default()
        };

        let pairs: HashMap<&str, String> = config.to_env_pairs().into_iter().collect();
        let restored = AppConfig::from_lookup(|key| pairs.get(key).cloned()).unwrap();

        assert_eq!(restored, config);
    }
}
