//! Output module for persisting fetched pages and reporting on a run
//!
//! This module handles:
//! - Deriving flat filenames from page URLs
//! - Writing fetched artifacts from a single consumer task
//! - Scanning an existing mirror for resume
//! - Recording crawl statistics

mod sink;
pub mod stats;

pub use sink::{
    derive_filename, scan_existing, FileArtifact, PersistenceSink, SinkError, SinkReport,
    INDEX_FILENAME,
};
pub use stats::{print_statistics, CrawlStats, StatsCounters};
