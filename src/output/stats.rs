//! Statistics for a finished crawl run
//!
//! The supervisor keeps lock-free counters while the crawl runs and snapshots them
//! into a [`CrawlStats`] once the run has drained.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters updated by crawl tasks
#[derive(Debug, Default)]
pub struct StatsCounters {
    pub pages_fetched: AtomicU64,
    pub pages_failed: AtomicU64,
    pub links_discovered: AtomicU64,
    pub children_scheduled: AtomicU64,
}

impl StatsCounters {
    pub fn record_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_links(&self, discovered: usize, scheduled: usize) {
        self.links_discovered
            .fetch_add(discovered as u64, Ordering::Relaxed);
        self.children_scheduled
            .fetch_add(scheduled as u64, Ordering::Relaxed);
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStats {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run drained
    pub finished_at: DateTime<Utc>,

    /// URLs claimed in the frontier
    pub pages_claimed: u64,

    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Pages whose fetch failed or never started
    pub pages_failed: u64,

    /// Same-origin links extracted across all pages
    pub links_discovered: u64,

    /// Child tasks created from those links
    pub children_scheduled: u64,

    /// Files written by the persistence sink
    pub files_written: u64,

    /// Artifacts the sink failed to write
    pub write_failures: u64,

    /// Whether the run was stopped before the frontier was exhausted
    pub stopped_early: bool,
}

impl CrawlStats {
    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Fraction of claimed pages that were fetched, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_claimed == 0 {
            0.0
        } else {
            (self.pages_fetched as f64 / self.pages_claimed as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Mirror Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Finished: {}", stats.finished_at.to_rfc3339());
    println!(
        "  Duration: {:.1}s",
        stats.duration().num_milliseconds() as f64 / 1000.0
    );
    if stats.stopped_early {
        println!("  Stopped early by interrupt");
    }
    println!();

    println!("Pages:");
    println!("  Claimed: {}", stats.pages_claimed);
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Failed: {}", stats.pages_failed);
    println!("  Links discovered: {}", stats.links_discovered);
    println!("  Children scheduled: {}", stats.children_scheduled);
    println!();

    println!("Files:");
    println!("  Written: {}", stats.files_written);
    if stats.write_failures > 0 {
        println!("  Write failures: {}", stats.write_failures);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_claimed
    );
}
