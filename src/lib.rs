//! Sumi-Mirror: an offline mirror for a single website
//!
//! This crate downloads every page reachable from a root URL on the same scheme and
//! host, saves each body into a flat output directory, and follows links up to a
//! configurable depth and page budget.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Sumi-Mirror operations
///
/// Only startup-time failures surface through this type. Errors that happen inside a
/// running crawl (fetch failures, write failures) are isolated to their task or
/// artifact and reported through logging and [`output::CrawlStats`].
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Cannot create output directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Crawl has already been started on this supervisor")]
    AlreadyStarted,

    #[error("Persistence task failed: {0}")]
    SinkTask(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{run_mirror, Supervisor};
pub use output::CrawlStats;
pub use state::{SupervisorState, TaskState};
pub use crate::url::{frontier_key, same_origin};
