//! Configuration module for Sumi-Mirror
//!
//! A run is configured from command-line arguments, optionally layered over a
//! TOML settings file:
//!
//! ```toml
//! [crawler]
//! max-depth = 3
//! max-pages = 500
//! concurrency = 8
//! fetch-timeout-secs = 30
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sumi_mirror::config::{load_settings, CrawlConfig};
//! use std::path::Path;
//! use url::Url;
//!
//! let settings = load_settings(Path::new("mirror.toml")).unwrap();
//! let config = CrawlConfig::new(Url::parse("https://example.com/").unwrap(), "./mirror")
//!     .apply_settings(&settings);
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlerSettings, SettingsFile, DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_PAGES,
};

// Re-export parser and validation functions
pub use parser::{compute_settings_hash, load_settings, load_settings_with_hash};
pub use validation::{validate, MAX_CONCURRENCY};
