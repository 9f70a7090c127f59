//! News-Harvest main entry point
//!
//! This is the command-line interface for the News-Harvest crawler.

use anyhow::Context;
use clap::Parser;
use news_harvest::config::{load_config, validate, Config, Overrides};
use news_harvest::crawler::run_crawl;
use news_harvest::output::{generate_markdown_summary, load_statistics, print_statistics};
use news_harvest::storage::open_existing_store;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// News-Harvest: a sequential news crawler
///
/// Walks a range of listing pages, extracts language-tagged articles and
/// stores every article not seen before in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "news-harvest")]
#[command(version)]
#[command(about = "Crawl language-tagged news articles into SQLite", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// First listing page index
    #[arg(long, value_name = "N")]
    start_page: Option<u32>,

    /// Number of listing pages to walk
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Site origin, e.g. https://news.example.org
    #[arg(long, value_name = "URL")]
    origin: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Path to the SQLite database
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Write a markdown summary of the database and exit
    #[arg(long, value_name = "FILE", num_args = 0..=1, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: Option<Option<PathBuf>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(path) = &cli.export_summary {
        let path = path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.summary_path));
        handle_export_summary(&config, &path)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_harvest=info,warn"),
            1 => EnvFilter::new("news_harvest=debug,info"),
            2 => EnvFilter::new("news_harvest=trace,debug"),
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

/// Loads the config file (or defaults) and applies command-line overrides
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => {
            let config = Config::default();
            validate(&config)?;
            config
        }
    };

    let overrides = Overrides {
        start_page: cli.start_page,
        page_count: cli.pages,
        origin: cli.origin.clone(),
        request_timeout_secs: cli.timeout,
        database_path: cli.database.clone(),
    };

    Ok(overrides.apply(config)?)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== News-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Origin: {}", config.site.origin);
    println!("  Listing path: {}", config.site.listing_path);

    println!("\nCrawler Configuration:");
    println!("  Start page: {}", config.crawler.start_page);
    println!("  Page count: {}", config.crawler.page_count);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  User agents: {}", config.user_agent.pool.len());

    println!("\nCompound Labels ({}):", config.languages.compound.len());
    for entry in &config.languages.compound {
        println!("  - {} => {}", entry.label, entry.expands.join(", "));
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let first = config.crawler.start_page;
    let last = first + config.crawler.page_count - 1;
    let origin = config.site.origin.trim_end_matches('/');
    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would fetch {}{}{} through {}{}{}",
        origin, config.site.listing_path, first, origin, config.site.listing_path, last
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_existing_store(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config, path: &Path) -> anyhow::Result<()> {
    let store = open_existing_store(Path::new(&config.output.database_path))?;

    tracing::info!("Loading statistics from {}", config.output.database_path);
    let stats = load_statistics(&store)?;

    generate_markdown_summary(&stats, path)
        .with_context(|| format!("writing {}", path.display()))?;

    println!("✓ Summary exported to: {}", path.display());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} listing pages from {} (starting at {})",
        config.crawler.page_count,
        config.site.origin,
        config.crawler.start_page
    );

    match run_crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Crawl finished: {} new items, {} duplicates, {} failed blocks, {} failed pages",
                report.items_inserted,
                report.duplicates,
                report.failed_blocks(),
                report.pages_failed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
