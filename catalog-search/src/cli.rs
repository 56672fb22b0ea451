//! Command line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "catalog-search")]
#[command(about = "Sets up the catalog search index and evaluates prefix queries against it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by all commands. Each one overrides its environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// OpenSearch URL [env: OPENSEARCH_URL]
    #[arg(long, global = true)]
    pub opensearch_url: Option<String>,

    /// Index name [env: OPENSEARCH_INDEX]
    #[arg(long, global = true)]
    pub index_name: Option<String>,

    /// XML product catalog [env: CATALOG_PATH]
    #[arg(long, global = true)]
    pub catalog_path: Option<PathBuf>,

    /// Prefix queries CSV [env: QUERIES_PATH]
    #[arg(long, global = true)]
    pub queries_path: Option<PathBuf>,

    /// Evaluation report CSV [env: REPORT_PATH]
    #[arg(long, global = true)]
    pub report_path: Option<PathBuf>,

    /// Readiness attempts before giving up [env: READY_MAX_ATTEMPTS]
    #[arg(long, global = true)]
    pub ready_attempts: Option<u32>,

    /// Seconds between readiness attempts [env: READY_INTERVAL_SECS]
    #[arg(long, global = true)]
    pub ready_interval_secs: Option<u64>,

    /// Documents per bulk request [env: BULK_BATCH_SIZE]
    #[arg(long, global = true)]
    pub batch_size: Option<usize>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Wait for the search engine, create the index and load the catalog
    Setup,
    /// Run the prefix queries and write the evaluation report
    Evaluate,
    /// Run setup, then evaluate if setup succeeded
    Run,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Setup => "setup",
            Commands::Evaluate => "evaluate",
            Commands::Run => "run",
        }
    }
}
