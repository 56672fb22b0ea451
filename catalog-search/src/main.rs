use std::env;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use catalog_search::cli::{Cli, Commands};
use catalog_search::config::LogFormat;
use catalog_search::{AppConfig, Dependencies, Step, StepChain};
use catalog_search_pipeline::{Evaluator, Setup};

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config.apply_overrides(&cli.global),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    init_tracing(config.log_format);

    let result = match cli.command {
        Commands::Setup => run_setup(&config).await.map(|_| 0),
        Commands::Evaluate => run_evaluate(&config).await.map(|_| 0),
        Commands::Run => run_chain(&config).await,
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!(command = cli.command.name(), error = %e, "Command failed");
            eprintln!("\nError: {}", e);

            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }

            process::exit(1);
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn run_setup(config: &AppConfig) -> Result<()> {
    let deps = Dependencies::new(config)?;

    let report = Setup::new(deps.search_client, config.setup_config())
        .run()
        .await
        .context("Catalog index setup failed")?;

    info!(
        ready_after_attempts = report.ready_after_attempts,
        indexed = report.load.succeeded,
        failed = report.load.failed,
        "Setup finished"
    );
    Ok(())
}

async fn run_evaluate(config: &AppConfig) -> Result<()> {
    let deps = Dependencies::new(config)?;

    Evaluator::new(deps.search_client)
        .run(&config.queries_path, &config.report_path)
        .await
        .context("Prefix query evaluation failed")?;

    Ok(())
}

/// Run `setup` and then `evaluate` as child processes of this executable.
async fn run_chain(config: &AppConfig) -> Result<i32> {
    let exe = env::current_exe().context("Failed to locate the current executable")?;

    let chain = [Commands::Setup, Commands::Evaluate]
        .into_iter()
        .fold(StepChain::new(), |chain, command| {
            chain.then(
                Step::new(command.name(), exe.clone())
                    .arg(command.name())
                    .envs(config.to_env_pairs()),
            )
        });

    let outcome = chain.run().await;

    info!(
        exit_code = outcome.exit_code,
        completed = ?outcome.completed,
        failed = ?outcome.failed,
        "Run finished"
    );
    Ok(outcome.exit_code)
}
