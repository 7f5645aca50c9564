use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default maximum link depth from the root page
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Default cap on the number of pages claimed in one run
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Default number of concurrent fetches
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Contents of an optional TOML settings file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub crawler: CrawlerSettings,
}

/// Crawler limits that can be provided from a settings file
///
/// Every key is optional; command-line flags take precedence over the file, and
/// the file takes precedence over the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlerSettings {
    /// Maximum depth to crawl from the root URL
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Maximum number of pages claimed in one run
    #[serde(rename = "max-pages")]
    pub max_pages: Option<usize>,

    /// Maximum number of concurrent fetches
    pub concurrency: Option<usize>,

    /// Per-fetch deadline in seconds
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: Option<u64>,
}

/// Configuration for one crawl run
///
/// Immutable for the duration of the run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Root URL; its scheme and host bound the crawl
    pub root_url: Url,

    /// Directory that receives one file per fetched page
    pub output_dir: PathBuf,

    /// Maximum link depth (root is depth 0)
    pub max_depth: u32,

    /// Maximum number of claimed pages
    pub max_pages: usize,

    /// Maximum number of concurrent fetches
    pub concurrency: usize,

    /// Skip URLs whose output file already exists
    pub resume: bool,

    /// Optional per-fetch deadline
    pub fetch_timeout: Option<Duration>,
}

impl CrawlConfig {
    /// Creates a configuration with default limits
    pub fn new(root_url: Url, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_url,
            output_dir: output_dir.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            concurrency: DEFAULT_CONCURRENCY,
            resume: false,
            fetch_timeout: None,
        }
    }

    /// Overlays values from a settings file onto this configuration
    pub fn apply_settings(mut self, settings: &CrawlerSettings) -> Self {
        if let Some(max_depth) = settings.max_depth {
            self.max_depth = max_depth;
        }
        if let Some(max_pages) = settings.max_pages {
            self.max_pages = max_pages;
        }
        if let Some(concurrency) = settings.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(secs) = settings.fetch_timeout_secs {
            self.fetch_timeout = Some(Duration::from_secs(secs));
        }
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}
