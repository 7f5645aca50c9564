//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror site mirroring tool.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use sumi_mirror::config::{load_settings_with_hash, CrawlConfig};
use sumi_mirror::crawler::run_mirror;
use sumi_mirror::output::{print_statistics, CrawlStats};
use sumi_mirror::url::parse_root_url;
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: an offline mirror for a single website
///
/// Downloads every page reachable from START_URL on the same scheme and host,
/// saving each one as a flat file in DEST_DIR.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version = "1.0.0")]
#[command(about = "Mirror a website into a local directory", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Directory to write downloaded pages into
    #[arg(value_name = "DEST_DIR")]
    dest_dir: PathBuf,

    /// Maximum link depth from the start page (0 fetches only the start page)
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Maximum number of pages to download
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Maximum number of concurrent downloads
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Skip pages whose output file already exists
    #[arg(long)]
    resume: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Path to a TOML settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_exit_code(&e));
        }
    };

    setup_logging(cli.verbose, cli.quiet);

    match handle_mirror(cli).await {
        Ok(stats) => {
            print_statistics(&stats);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Exit status for an argument parsing failure
///
/// `--help` and `--version` are reported through clap's error path but are not
/// errors.
fn parse_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_mirror=info,warn"),
            1 => EnvFilter::new("sumi_mirror=debug,info"),
            2 => EnvFilter::new("sumi_mirror=trace,debug"),
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

/// Builds the run configuration from flags and the optional settings file
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let root_url = parse_root_url(&cli.start_url)
        .with_context(|| format!("Invalid start URL '{}'", cli.start_url))?;

    let mut config = CrawlConfig::new(root_url, cli.dest_dir.clone());

    if let Some(path) = &cli.config {
        tracing::info!("Loading settings from: {}", path.display());
        let (settings, hash) = load_settings_with_hash(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
        tracing::info!("Settings loaded successfully (hash: {})", hash);
        config = config.apply_settings(&settings);
    }

    if let Some(max_depth) = cli.max_depth {
        config = config.with_max_depth(max_depth);
    }
    if let Some(max_pages) = cli.max_pages {
        config = config.with_max_pages(max_pages);
    }
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_fetch_timeout(Some(Duration::from_secs(secs)));
    }

    Ok(config.with_resume(cli.resume))
}

/// Handles the main mirror operation
async fn handle_mirror(cli: Cli) -> anyhow::Result<CrawlStats> {
    let config = build_config(&cli)?;

    if config.resume {
        tracing::info!("Resume enabled: existing files in the output directory are kept");
    }

    let stats = run_mirror(config).await.context("Mirror failed to start")?;

    if stats.stopped_early {
        tracing::info!("Mirror stopped early; run again with --resume to continue");
    } else {
        tracing::info!("Mirror completed successfully");
    }

    Ok(stats)
}
