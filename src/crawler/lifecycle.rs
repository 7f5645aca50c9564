//! Lifecycle controller: start, interrupt, resume
//!
//! Wraps a [`Supervisor`] with the process-level concerns of a mirror run:
//! creating the output directory, pre-seeding the frontier on resume, and turning
//! Ctrl-C into a graceful stop that still waits for every queued artifact to be
//! written.

use crate::config::{validate, CrawlConfig};
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::supervisor::Supervisor;
use crate::output::{scan_existing, CrawlStats};
use crate::{MirrorError, Result};
use std::future::Future;
use std::sync::Arc;

/// Exit code used when a second interrupt forces the process down
pub const FORCE_EXIT_CODE: i32 = 130;

/// Runs a complete mirror operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Validate the configuration
/// 2. Create the output directory
/// 3. Build the HTTP fetcher
/// 4. Pre-seed the frontier from existing files when resuming
/// 5. Run the supervisor until it drains or Ctrl-C stops it
///
/// # Errors
///
/// Only startup failures are returned: invalid configuration, an output
/// directory that cannot be created, or an HTTP client that cannot be built.
pub async fn run_mirror(config: CrawlConfig) -> Result<CrawlStats> {
    let supervisor = prepare(config).await?;
    run_until(&supervisor, interrupt_signal()).await
}

/// Builds a ready-to-run supervisor backed by the real HTTP fetcher
pub async fn prepare(config: CrawlConfig) -> Result<Supervisor> {
    validate(&config)?;

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|source| MirrorError::Directory {
            path: config.output_dir.clone(),
            source,
        })?;

    let fetcher = Arc::new(HttpFetcher::with_timeout(config.fetch_timeout)?);
    let resume = config.resume;
    let output_dir = config.output_dir.clone();
    let supervisor = Supervisor::new(config, fetcher);

    if resume {
        let existing = scan_existing(&output_dir).await?;
        tracing::info!(
            "Resuming: {} existing files in {} will not be fetched again",
            existing.len(),
            output_dir.display()
        );
        supervisor.preseed_existing(existing);
    }

    Ok(supervisor)
}

/// Drives a supervisor until it drains, stopping it when `shutdown` resolves first
///
/// After a stop the supervisor is still awaited to completion, so every task
/// finishes and every artifact already fetched is persisted before this returns.
pub async fn run_until<F>(supervisor: &Supervisor, shutdown: F) -> Result<CrawlStats>
where
    F: Future<Output = ()>,
{
    let crawl = supervisor.run();
    tokio::pin!(crawl);
    tokio::pin!(shutdown);

    tokio::select! {
        result = &mut crawl => return result,
        _ = &mut shutdown => {
            tracing::warn!("Interrupt received, finishing in-flight pages...");
            supervisor.stop();
        }
    }

    crawl.await
}

/// Resolves on the first Ctrl-C
///
/// A second Ctrl-C exits the process immediately with [`FORCE_EXIT_CODE`],
/// abandoning any pages still in flight. If the signal handler cannot be
/// installed the future never resolves, and the crawl simply runs to completion.
pub async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }

    eprintln!("\nReceived Ctrl+C, stopping after in-flight pages finish...");
    eprintln!("Press Ctrl+C again to force quit");

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nForce quit requested, exiting immediately...");
            std::process::exit(FORCE_EXIT_CODE);
        }
    });
}
