//! Avito-Monitor main entry point
//!
//! This is the command-line interface for the Avito listing monitor.

use avito_monitor::config::{load_config, Config};
use avito_monitor::crawler::collect_listings;
use avito_monitor::output::{generate_summary, write_summary};
use avito_monitor::storage::{CsvStorage, LoadSelector, Storage, StorageBackend, StorageKind};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Avito-Monitor: a classified-ad price monitor
///
/// Collects listings from an Avito search results URL, prints price
/// statistics and anomalies, and stores the snapshot as CSV or in SQLite.
#[derive(Parser, Debug)]
#[command(name = "avito-monitor")]
#[command(version = "1.0.0")]
#[command(about = "Classified-ad price monitor", long_about = None)]
struct Cli {
    /// Search results URL to collect listings from
    #[arg(long)]
    url: Option<String>,

    /// Where to store the collected listings
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    output: OutputFormat,

    /// Maximum number of listings to collect
    #[arg(long, default_value_t = 100)]
    limit: usize,

    /// Path to a KEY=value configuration file (default: config.env, then .env)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Earlier CSV snapshot in the CSV directory to compare the new listings with
    #[arg(long, value_name = "FILE")]
    compare: Option<String>,

    /// Also write the summary to this file
    #[arg(long, value_name = "PATH")]
    summary_path: Option<PathBuf>,

    /// Summarize the most recently stored listings and exit
    #[arg(long, conflicts_with = "url")]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Sqlite,
}

impl From<OutputFormat> for StorageKind {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => StorageKind::Csv,
            OutputFormat::Sqlite => StorageKind::Sqlite,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let kind = StorageKind::from(cli.output);

    if cli.stats {
        return handle_stats(&config, kind);
    }

    handle_collect(&cli, &config, kind).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("avito_monitor=info,warn"),
            1 => EnvFilter::new("avito_monitor=debug,info"),
            2 => EnvFilter::new("avito_monitor=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --stats mode: summarizes the latest stored listings
fn handle_stats(config: &Config, kind: StorageKind) -> ExitCode {
    let backend = match StorageBackend::open(kind, &config.storage) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!("Failed to open {} storage: {}", kind, e);
            return ExitCode::FAILURE;
        }
    };

    let records = match backend.load(&LoadSelector::latest()) {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Failed to load stored listings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if records.is_empty() {
        tracing::error!("No stored listings found in {} storage", kind);
        return ExitCode::FAILURE;
    }

    println!("{}", generate_summary(&records, None));
    ExitCode::SUCCESS
}

/// Handles the main collect, summarize and save run
async fn handle_collect(cli: &Cli, config: &Config, kind: StorageKind) -> ExitCode {
    let Some(url) = cli.url.as_deref() else {
        tracing::error!("No search URL given, use --url");
        return ExitCode::FAILURE;
    };

    let records = match collect_listings(&config.scraper, url, cli.limit).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Collection failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if records.is_empty() {
        tracing::error!("No listings collected from {}", url);
        return ExitCode::FAILURE;
    }
    tracing::info!("Collected {} listings", records.len());

    let previous = cli.compare.as_deref().and_then(|name| {
        let storage = CsvStorage::new(&config.storage);
        match storage.load(&LoadSelector::file(name)) {
            Ok(previous) => Some(previous),
            Err(e) => {
                tracing::warn!("Skipping comparison, cannot read {}: {}", name, e);
                None
            }
        }
    });

    let summary = generate_summary(&records, previous.as_deref());
    println!("{}", summary);

    if let Some(path) = &cli.summary_path {
        match write_summary(&summary, path) {
            Ok(()) => tracing::info!("Summary written to {}", path.display()),
            Err(e) => tracing::warn!("Failed to write summary to {}: {}", path.display(), e),
        }
    }

    let priced = records.iter().filter(|r| r.has_price()).count();
    tracing::info!("{} of {} listings have a price", priced, records.len());

    let mut backend = match StorageBackend::open(kind, &config.storage) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!("Failed to open {} storage: {}", kind, e);
            return ExitCode::FAILURE;
        }
    };

    if !backend.save(&records) {
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
