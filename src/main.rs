//! Site-Snapshot main entry point
//!
//! This is the command-line interface for the site snapshot extractor.

use anyhow::Context;
use clap::Parser;
use site_snapshot::config::{load_config_with_hash, Config};
use site_snapshot::crawler::{Coordinator, Scheduler};
use site_snapshot::output::{generate_markdown_report, print_statistics, BatchStatistics};
use site_snapshot::url::normalize_request_url;
use site_snapshot::ChromiumLauncher;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Snapshot: website metadata and visual snapshot extraction
///
/// Opens each URL in a headless browser, captures a thumbnail, and reports
/// the social profiles, app-store listings and affiliate links found on the
/// landing page. Results are printed as one JSON document per line.
#[derive(Parser, Debug)]
#[command(name = "site-snapshot")]
#[command(version = "1.0.0")]
#[command(about = "Website metadata and visual snapshot extractor", long_about = None)]
struct Cli {
    /// URLs to snapshot (scheme optional, https assumed)
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without launching a browser
    #[arg(long)]
    dry_run: bool,

    /// Pretty-print JSON results
    #[arg(long)]
    pretty: bool,

    /// Write a markdown report of the batch to FILE
    #[arg(long, value_name = "FILE", conflicts_with = "dry_run")]
    summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), None)
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli.urls);
        return Ok(());
    }

    handle_crawl(config, config_hash, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout is reserved for JSON results.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_snapshot=info,warn"),
            1 => EnvFilter::new("site_snapshot=debug,info"),
            2 => EnvFilter::new("site_snapshot=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings and normalized URLs
fn handle_dry_run(config: &Config, urls: &[String]) {
    println!("=== Site-Snapshot Dry Run ===\n");

    println!("Browser:");
    match &config.browser.executable {
        Some(path) => println!("  Executable: {}", path.display()),
        None => println!("  Executable: auto-detect"),
    }
    println!("  Headless: {}", config.browser.headless);
    println!("  Sandbox: {}", config.browser.sandbox);
    println!(
        "  Window: {}x{}",
        config.browser.window_width, config.browser.window_height
    );
    println!("  User agent: {}", config.browser.user_agent);

    println!("\nTimeouts:");
    println!("  Launch: {}ms", config.timeouts.launch_ms);
    println!("  Navigation: {}ms", config.timeouts.navigation_ms);
    println!("  Settle: {}ms", config.timeouts.settle_ms);
    println!("  Capture: {}ms", config.timeouts.capture_ms);
    println!("  Close: {}ms", config.timeouts.close_ms);

    println!("\nImages:");
    println!(
        "  Directory: {}",
        config.images.public_root.join(&config.images.directory).display()
    );
    println!(
        "  Thumbnail: {}x{}",
        config.images.thumbnail_width, config.images.thumbnail_height
    );
    println!("  Keep raw captures: {}", config.images.keep_raw_captures);

    println!(
        "\nMax concurrent sessions: {}",
        config.crawler.max_concurrent_sessions
    );

    println!("\nURLs ({}):", urls.len());
    let mut valid = 0;
    for url in urls {
        match normalize_request_url(url) {
            Ok(normalized) => {
                valid += 1;
                println!("  - {} -> {}", url, normalized);
            }
            Err(e) => println!("  - {} (invalid: {})", url, e),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would snapshot {} of {} URLs", valid, urls.len());
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: Option<String>,
    cli: &Cli,
) -> anyhow::Result<()> {
    let launcher = ChromiumLauncher::new(&config);
    let scheduler = Scheduler::new(Coordinator::new(config, launcher));

    let entries = scheduler.crawl_all(cli.urls.clone()).await;

    for entry in &entries {
        match &entry.outcome {
            Ok(result) => {
                let json = if cli.pretty {
                    serde_json::to_string_pretty(result)
                } else {
                    serde_json::to_string(result)
                }
                .context("Failed to serialize crawl result")?;
                println!("{}", json);
            }
            Err(e) => tracing::error!("Crawl of {} failed: {}", entry.url, e),
        }
    }

    let stats = BatchStatistics::from_entries(&entries);
    if !cli.quiet {
        print_statistics(&stats);
    }

    if let Some(path) = &cli.summary {
        generate_markdown_report(&entries, config_hash.as_deref(), path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    if stats.fatal_errors == stats.total {
        anyhow::bail!("All {} crawls failed", stats.total);
    }

    Ok(())
}
