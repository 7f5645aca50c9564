//! URL frontier: deduplication and quota bookkeeping
//!
//! Every crawl task must win a claim here before it is fetched. A claim is a single
//! check-and-insert under one lock, so concurrent tasks racing on the same URL see
//! exactly one winner. The lock is held only for the set lookup and insert, never
//! across network I/O.

use crate::output::derive_filename;
use crate::url::frontier_key;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

/// State guarded by the frontier lock
#[derive(Debug, Default)]
struct FrontierInner {
    /// Frontier keys of every claimed URL; entries are never removed
    visited: HashSet<String>,

    /// Number of successful claims
    claimed: usize,

    /// Filenames already present in the output directory (resume only)
    existing: HashSet<String>,
}

/// Concurrency-safe set of claimed URLs with depth and page limits
///
/// # Resume
///
/// When seeded with existing filenames, a non-root URL whose derived filename is
/// already on disk is refused as if it had been visited. The filename mapping is
/// lossy, so this is a best-effort skip rather than an exact restoration. The root
/// is always eligible so a resumed crawl can still discover new pages, and refused
/// URLs do not count toward the page limit.
#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    stopped: AtomicBool,
    max_depth: u32,
    max_pages: usize,
}

impl Frontier {
    pub fn new(max_depth: u32, max_pages: usize) -> Self {
        Self {
            inner: Mutex::new(FrontierInner::default()),
            stopped: AtomicBool::new(false),
            max_depth,
            max_pages,
        }
    }

    /// Atomically claims a URL for processing
    ///
    /// Returns `false` when the crawl has been stopped, when `depth` exceeds the
    /// maximum depth, when the page limit has been reached, or when the URL (by
    /// frontier key) has already been claimed.
    pub fn try_claim(&self, url: &Url, depth: u32) -> bool {
        if self.is_stopped() || depth > self.max_depth {
            return false;
        }

        let key = frontier_key(url);
        let mut inner = self.inner.lock();

        // Re-checked under the lock so no claim succeeds after stop() returns
        if self.is_stopped() || inner.claimed >= self.max_pages {
            return false;
        }

        if inner.visited.contains(&key) {
            return false;
        }

        if depth > 0
            && !inner.existing.is_empty()
            && inner.existing.contains(&derive_filename(url))
        {
            tracing::trace!("Skipping {}: output file already exists", url);
            return false;
        }

        inner.visited.insert(key);
        inner.claimed += 1;
        true
    }

    /// Stops the frontier; every later claim fails
    ///
    /// Idempotent. Taking the lock orders this store after any claim already in
    /// its critical section.
    pub fn stop(&self) {
        let _guard = self.inner.lock();
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Number of URLs claimed so far
    pub fn claimed_count(&self) -> usize {
        self.inner.lock().claimed
    }

    /// Returns true if the URL has been claimed
    pub fn is_visited(&self, url: &Url) -> bool {
        self.inner.lock().visited.contains(&frontier_key(url))
    }

    /// Pre-seeds the frontier with filenames found in the output directory
    pub fn seed_existing<I>(&self, filenames: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut inner = self.inner.lock();
        inner.existing.extend(filenames);
        tracing::debug!(
            "Frontier seeded with {} existing files",
            inner.existing.len()
        );
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
