//! OCDB Harvest main entry point
//!
//! This is the command-line interface for the OCDB Harvest episode crawler.

use anyhow::Context;
use clap::Parser;
use ocdb_harvest::config::{load_config_with_hash, validate, Config};
use ocdb_harvest::crawler::{run_crawl, CrawlOptions};
use ocdb_harvest::output::{collect_statistics, print_report, print_statistics};
use ocdb_harvest::storage::{open_storage, ProgressStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Cap used by `--test`
const TEST_RUN_EPISODES: usize = 3;

/// OCDB Harvest: a polite, resumable quiz-archive crawler
///
/// Discovers every episode on the archive's listing page, fetches each
/// episode with adaptive backoff, and saves the four extracted rounds.
/// Progress is checkpointed so an interrupted crawl picks up where it left
/// off.
#[derive(Parser, Debug)]
#[command(name = "ocdb-harvest")]
#[command(version)]
#[command(about = "A polite, resumable quiz-archive crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of episodes to scrape this run
    #[arg(long, value_name = "N", conflicts_with = "test")]
    max: Option<usize>,

    /// Test mode: scrape only 3 episodes
    #[arg(long)]
    test: bool,

    /// Start fresh, ignoring saved progress
    #[arg(long)]
    no_resume: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the saved episodes and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn max_episodes(&self) -> Option<usize> {
        if self.test {
            Some(TEST_RUN_EPISODES)
        } else {
            self.max
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load(cli.config.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config, &cli);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, config_hash, &cli).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ocdb_harvest=info,warn"),
            1 => EnvFilter::new("ocdb_harvest=debug,info"),
            2 => EnvFilter::new("ocdb_harvest=trace,debug"),
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

/// Loads the configuration file if one was given, else validated defaults
fn load(path: Option<&Path>) -> anyhow::Result<(Config, Option<String>)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, Some(hash)))
        }
        None => {
            let config = Config::default();
            validate(&config).context("Default configuration is invalid")?;
            tracing::debug!("No configuration file given, using defaults");
            Ok((config, None))
        }
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, cli: &Cli) {
    println!("=== OCDB Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Listing: {}", config.listing_url());
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Checkpoint every: {} episodes", config.crawler.checkpoint_every);

    println!("\nRate Limit:");
    println!(
        "  Delay: {}ms to {}ms",
        config.rate_limit.min_delay_ms, config.rate_limit.max_delay_ms
    );
    println!("  Success decay: {}", config.rate_limit.success_decay);
    println!("  Backoff factor: {}", config.rate_limit.backoff_factor);
    println!("  Max jitter: {}ms", config.rate_limit.max_jitter_ms);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Episodes: {}", config.output.episodes_path);
    println!("  Progress: {}", config.output.progress_path);

    println!("\nRun:");
    println!("  Resume: {}", !cli.no_resume);
    match cli.max_episodes() {
        Some(max) => println!("  Episode cap: {}", max),
        None => println!("  Episode cap: none"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: summarizes the saved artifacts
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = open_storage(&config.output);
    println!("Episodes: {}", store.episodes_path().display());
    println!("Progress: {}\n", store.progress_path().display());

    let progress = store.load().context("Failed to load progress index")?;
    let records = store.load_records().context("Failed to load episode records")?;

    print_statistics(&collect_statistics(&progress, &records));
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: Option<String>,
    cli: &Cli,
) -> anyhow::Result<()> {
    let options = CrawlOptions {
        max_episodes: cli.max_episodes(),
        resume: !cli.no_resume,
    };

    if let Some(max) = options.max_episodes {
        tracing::info!("Limiting this run to {} episodes", max);
    }

    let episodes_path = PathBuf::from(&config.output.episodes_path);
    let progress_path = PathBuf::from(&config.output.progress_path);

    match run_crawl(config, options, config_hash).await {
        Ok(report) => {
            print_report(&report, &episodes_path, &progress_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
