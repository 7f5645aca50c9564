//! Persistence sink: the single writer of the output directory
//!
//! Fetch tasks push [`FileArtifact`]s onto a bounded channel; one sink task drains
//! it and writes each artifact in a single operation. Because only the sink
//! touches the output directory, writes never race each other.
//!
//! # Filename collisions
//!
//! The URL-to-filename mapping is lossy: `/a/page` and `/b/page` both become
//! `page.html`. Colliding artifacts overwrite each other in channel arrival order,
//! which depends on fetch timing and is not deterministic.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

/// Filename used when a URL path has no usable last segment
pub const INDEX_FILENAME: &str = "index.html";

/// Errors raised while persisting one artifact
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Downloaded content for one successfully fetched URL
#[derive(Debug, Clone)]
pub struct FileArtifact {
    /// The URL the content was fetched from
    pub source_url: Url,

    /// Raw response body
    pub content: Vec<u8>,

    /// Filename inside the output directory
    pub filename: String,
}

impl FileArtifact {
    /// Builds an artifact, deriving its filename from the source URL
    pub fn new(source_url: Url, content: Vec<u8>) -> Self {
        let filename = derive_filename(&source_url);
        Self {
            source_url,
            content,
            filename,
        }
    }
}

/// Derives the output filename for a URL
///
/// # Rules
///
/// 1. Take the last non-empty path segment (trailing slashes are ignored)
/// 2. If there is none, or it is `.` or `..`, use `index.html`
/// 3. If the segment contains no `.`, append `.html`
///
/// The query string and fragment never take part in the name.
///
/// # Examples
///
/// ```
/// use sumi_mirror::output::derive_filename;
/// use url::Url;
///
/// assert_eq!(derive_filename(&Url::parse("http://example.com/").unwrap()), "index.html");
/// assert_eq!(derive_filename(&Url::parse("http://example.com/about").unwrap()), "about.html");
/// assert_eq!(derive_filename(&Url::parse("http://example.com/a/logo.png").unwrap()), "logo.png");
/// ```
pub fn derive_filename(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("");

    if segment.is_empty() || segment == "." || segment == ".." {
        return INDEX_FILENAME.to_string();
    }

    if segment.contains('.') {
        segment.to_string()
    } else {
        format!("{}.html", segment)
    }
}

/// Lists the regular files already present in `dir`
///
/// Used to pre-seed the frontier on resume. A missing directory yields an empty
/// set.
pub async fn scan_existing(dir: &Path) -> std::io::Result<HashSet<String>> {
    let mut names = HashSet::new();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
        Err(e) => return Err(e),
    };

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.insert(name.to_string());
            }
        }
    }

    Ok(names)
}

/// Outcome of draining the artifact channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    /// Artifacts written successfully
    pub written: u64,

    /// Artifacts whose write failed
    pub failed: u64,
}

/// Single consumer that writes artifacts into the output directory
#[derive(Debug, Clone)]
pub struct PersistenceSink {
    dest_dir: PathBuf,
}

impl PersistenceSink {
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
        }
    }

    /// Drains the channel until every sender is gone
    ///
    /// A failed write is logged and counted; the sink keeps draining.
    pub async fn drain(self, mut rx: mpsc::Receiver<FileArtifact>) -> SinkReport {
        let mut report = SinkReport::default();

        while let Some(artifact) = rx.recv().await {
            match self.write(&artifact).await {
                Ok(path) => {
                    report.written += 1;
                    tracing::debug!(
                        "Saved {} -> {} ({} bytes)",
                        artifact.source_url,
                        path.display(),
                        artifact.content.len()
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Failed to persist {}: {}", artifact.source_url, e);
                }
            }
        }

        tracing::debug!(
            "Artifact channel closed: {} written, {} failed",
            report.written,
            report.failed
        );
        report
    }

    /// Writes one artifact in a single operation
    async fn write(&self, artifact: &FileArtifact) -> Result<PathBuf, SinkError> {
        let path = self.dest_dir.join(&artifact.filename);

        tokio::fs::write(&path, &artifact.content)
            .await
            .map_err(|source| SinkError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}
