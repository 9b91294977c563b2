// src/main.rs
mod browser;
mod config;
mod document;
mod extractors;
mod pipeline;
mod record;
mod storage;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use browser::{discovery, HttpSessionFactory};
use config::{PipelineConfig, SelectorConfig};
use storage::StorageManager;
use utils::AppError;

const FAILURE_DISPLAY_LIMIT: usize = 10;

/// Mutual fund page scraper: discovers fund pages and extracts a grouped report
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Also append every log line to this file
    #[arg(long, global = true, env = "FUND_EXTRACTOR_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the fund listing and write the fund page URLs, one per line
    Discover(DiscoverArgs),
    /// Scrape every URL in the input list into a workbook
    Scrape(ScrapeArgs),
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    /// Site origin the listing and fund links live under
    #[arg(long, default_value = discovery::DEFAULT_ORIGIN, env = "FUND_EXTRACTOR_BASE_URL")]
    base_url: String,

    /// Number of numbered listing pages to walk
    #[arg(long, default_value = "105")]
    pages: u32,

    /// Where to write the URL list
    #[arg(short, long, default_value = "mutual_funds_links.txt")]
    output: PathBuf,

    /// JSON file overriding the class names used to find listing links
    #[arg(long, env = "FUND_EXTRACTOR_SELECTORS")]
    selectors: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Newline-delimited list of fund page URLs
    #[arg(short, long, default_value = "mutual_funds_links.txt", env = "FUND_EXTRACTOR_INPUT")]
    input: PathBuf,

    /// Output directory for the workbook and reports
    #[arg(short, long, default_value = "./output", env = "FUND_EXTRACTOR_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Number of concurrent workers, each with its own page session
    #[arg(short, long, default_value = "4", env = "FUND_EXTRACTOR_WORKERS")]
    workers: usize,

    /// Upper bound on waiting for the fund name element, in seconds
    #[arg(long, default_value = "10")]
    identity_timeout_secs: u64,

    /// Pause between content-size polls while a page settles, in milliseconds
    #[arg(long, default_value = "1000")]
    settle_interval_ms: u64,

    /// Lower bound of the random pause between items, in milliseconds
    #[arg(long, default_value = "500")]
    min_delay_ms: u64,

    /// Upper bound of the random pause between items, in milliseconds
    #[arg(long, default_value = "1500")]
    max_delay_ms: u64,

    /// JSON file overriding the class names the extractors key on
    #[arg(long, env = "FUND_EXTRACTOR_SELECTORS")]
    selectors: Option<PathBuf>,

    /// Debug mode - save annotated HTML of pages that failed extraction
    #[arg(short, long)]
    debug: bool,
}

fn load_selectors(path: Option<&PathBuf>) -> Result<SelectorConfig, AppError> {
    match path {
        Some(path) => SelectorConfig::load(path),
        None => Ok(SelectorConfig::default()),
    }
}

async fn run_discover(args: DiscoverArgs) -> Result<(), AppError> {
    let selectors = load_selectors(args.selectors.as_ref())?;
    let client = browser::http::build_client(browser::http::DEFAULT_USER_AGENT)
        .map_err(|e| AppError::Config(format!("Could not build HTTP client: {}", e)))?;

    let urls = discovery::discover_fund_urls(&client, &args.base_url, args.pages, &selectors.listing_link).await?;
    if urls.is_empty() {
        return Err(AppError::Processing("No fund links found on any listing page".to_string()));
    }
    discovery::write_url_list(&args.output, &urls)
}

async fn run_scrape(args: ScrapeArgs) -> Result<(), AppError> {
    let urls = discovery::read_url_list(&args.input).map_err(|e| {
        AppError::Config(format!("Could not read URL list {}: {}", args.input.display(), e))
    })?;
    if urls.is_empty() {
        return Err(AppError::Config(format!("No URLs in {}", args.input.display())));
    }
    if args.min_delay_ms > args.max_delay_ms {
        return Err(AppError::Config("--min-delay-ms must not exceed --max-delay-ms".to_string()));
    }

    let config = PipelineConfig {
        workers: args.workers,
        identity_timeout: Duration::from_secs(args.identity_timeout_secs),
        settle_interval: Duration::from_millis(args.settle_interval_ms),
        min_delay: Duration::from_millis(args.min_delay_ms),
        max_delay: Duration::from_millis(args.max_delay_ms),
        selectors: load_selectors(args.selectors.as_ref())?,
    };

    let storage = StorageManager::new(&args.output_dir)?;
    let debug_dir = args.debug.then(|| storage.debug_dir());
    let factory = Arc::new(HttpSessionFactory::default());

    let report = pipeline::run_pipeline(factory, urls, config, debug_dir).await?;
    let timestamp = storage::run_timestamp();

    if report.failures.is_empty() {
        tracing::info!("All tasks completed successfully.");
    } else {
        tracing::warn!("{} Failed Tasks:", report.failures.len());
        for line in pipeline::summarize_failures(&report.failures, FAILURE_DISPLAY_LIMIT) {
            tracing::warn!("{}", line);
        }
        match storage.save_failures(&report.failures, &timestamp) {
            Ok(path) => tracing::info!("Full failure list: {}", path.display()),
            Err(e) => tracing::error!("Failed to save failure report: {}", e),
        }
    }

    if report.records.is_empty() {
        tracing::warn!("No data collected to save.");
        return Err(AppError::Processing(format!(
            "Failed to extract any fund records from {} URLs",
            report.failures.len()
        )));
    }

    let groups = storage::group_by_fund_type(report.records);
    tracing::info!("Saving {} fund types...", groups.len());
    storage.save_workbook(&groups, &timestamp)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let cli = Cli::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(cli.log_file.as_deref())?;
    tracing::info!("Starting processing for args: {:?}", cli);

    // 3. Dispatch
    match cli.command {
        Command::Discover(args) => run_discover(args).await,
        Command::Scrape(args) => run_scrape(args).await,
    }
}
