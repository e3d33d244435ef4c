//! Product Harvester main entry point
//!
//! This is the command-line interface for the Product Harvester crawler.

use clap::{Parser, ValueEnum};
use product_harvester::config::{load_config_with_hash, HarvestConfig, OutputFormat};
use product_harvester::output::{print_statistics, sort_by_popularity, write_export, CrawlStatistics};
use product_harvester::url::build_search_url;
use product_harvester::Harvester;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Product Harvester: search-results crawler and product extractor
///
/// Walks the search-results pages for a keyword, visits every product found,
/// and exports product and review data as CSV or JSON.
#[derive(Parser, Debug)]
#[command(name = "product-harvester")]
#[command(version)]
#[command(about = "Crawl search results and export product data", long_about = None)]
struct Cli {
    /// Search keyword
    #[arg(value_name = "KEYWORD")]
    keyword: String,

    /// Number of listing pages to walk (1-10)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=10))]
    pages: u32,

    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory to write the export to
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Export format (overrides the configuration)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the first listing URL and effective settings without crawling
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path).map_err(|e| {
                tracing::error!("Failed to load configuration: {}", e);
                e
            })?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            HarvestConfig::default()
        }
    };

    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if let Some(dir) = &cli.output {
        config.output.directory = dir.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config, &cli.keyword, cli.pages)
    } else {
        handle_crawl(config, &cli.keyword, cli.pages).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("product_harvester=info,warn"),
            1 => EnvFilter::new("product_harvester=debug,info"),
            2 => EnvFilter::new("product_harvester=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be requested
fn handle_dry_run(config: &HarvestConfig, keyword: &str, pages: u32) -> anyhow::Result<()> {
    let first_page = build_search_url(&config.site, keyword, 1)?;

    println!("=== Product Harvester Dry Run ===\n");
    println!("First listing page: {}", first_page);
    println!("Pages requested:    {}", pages);
    println!(
        "Detail concurrency: {}",
        config.crawler.max_concurrent_details
    );
    println!(
        "Retry policy:       {} attempts, {:?} backoff from {}ms",
        config.fetch.max_attempts, config.fetch.backoff, config.fetch.retry_delay_ms
    );
    println!("Request timeout:    {}s", config.fetch.timeout_secs);
    println!("User agent:         {}", config.headers.user_agent);
    println!(
        "Export:             {}/ ({})",
        config.output.directory,
        config.output.format.extension()
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: HarvestConfig, keyword: &str, pages: u32) -> anyhow::Result<()> {
    let harvester = Harvester::new(config)?;

    let mut last_reported = 0;
    let mut result = harvester
        .crawl(keyword, pages, |progress| {
            let percent = (progress * 100.0).round() as u32;
            if percent >= last_reported + 10 || percent == 100 {
                tracing::info!("Progress: {}%", percent);
                last_reported = percent;
            }
        })
        .await?;

    if result.is_empty() {
        tracing::warn!("No products found for '{}'", keyword);
        return Ok(());
    }

    let stats = CrawlStatistics::from_result(&result);

    let output = &harvester.config().output;
    if output.sort_by_popularity {
        sort_by_popularity(&mut result.records);
    }
    let path = write_export(
        &result.records,
        &PathBuf::from(&output.directory),
        keyword,
        output.format,
    )?;

    print_statistics(&stats);
    println!("\n✓ Scraped {} products", result.len());
    println!("✓ Export written to: {}", path.display());

    Ok(())
}
