//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - The [`Fetcher`] capability the supervisor depends on
//! - Building the per-run HTTP client
//! - One GET per URL with the body fully drained
//! - Error classification (network failure vs. non-2xx status)

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Per-task fetch failure
///
/// Neither variant is fatal to the crawl; the task that produced it moves to
/// `Failed` and its siblings are unaffected.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS, timeout or body-read failure
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },
}

impl FetchError {
    /// Returns true for transport-level failures
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns the HTTP status for status failures
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Network { .. } => None,
        }
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the body was actually served from, after redirects
    ///
    /// Relative links in the body resolve against this, not the requested URL:
    /// `/docs` redirecting to `/docs/` changes what `href="intro"` points at.
    pub final_url: Url,

    /// HTTP status code (always 2xx)
    pub status: u16,

    /// Content-Type header value, if any
    pub content_type: Option<String>,

    /// Complete response body
    pub body: Vec<u8>,
}

/// Capability to download one URL
///
/// The supervisor only talks to this trait, so tests can substitute an in-memory
/// fixture for real network access.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn download(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds the HTTP client for one crawl run
///
/// Default headers and redirect policy; the only knob is an optional per-request
/// deadline.
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Some(Duration::from_secs(30))).unwrap();
/// ```
pub fn build_http_client(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// [`Fetcher`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with its own client
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(timeout)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Issues one GET and drains the body
    ///
    /// | Outcome | Result |
    /// |---------|--------|
    /// | 2xx | `Ok(FetchedPage)` |
    /// | Any other status | `HttpStatus` |
    /// | Connect/timeout/body error | `Network` |
    async fn download(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| network_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        if &final_url != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| network_error(url, &e))?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

/// Classifies a transport error
fn network_error(url: &Url, e: &reqwest::Error) -> FetchError {
    let message = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
    }
}
