//! Crawl supervisor - bounded concurrent crawl orchestration
//!
//! The supervisor owns all state for one crawl run:
//! - The [`Frontier`] that deduplicates URLs and enforces depth/page limits
//! - A semaphore bounding how many tasks fetch at once
//! - An in-flight counter paired with the artifact channel sender
//! - The persistence sink draining that channel
//!
//! # Task flow
//!
//! A task is only created for a URL that already won its frontier claim. The task
//! waits for a semaphore permit, fetches, forwards the body to the sink, extracts
//! links, claims each child at `depth + 1`, and spawns a new task for every child
//! it won. Parents never wait on children, so a parent's permit is released as
//! soon as its own work is done.
//!
//! # Termination
//!
//! Every task is registered in the in-flight counter before it is spawned and
//! holds its own clone of the artifact sender. When a task finishes it drops that
//! clone and decrements the counter; the decrement that reaches zero also drops
//! the master sender inside the same critical section. That closes the channel
//! exactly once, the sink sees the end of the stream, and `run` returns.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{extract_links, is_html};
use crate::output::{CrawlStats, FileArtifact, PersistenceSink, StatsCounters};
use crate::state::{SupervisorState, TaskState};
use crate::url::same_origin;
use crate::MirrorError;
use chrono::Utc;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use url::Url;

/// A unit of crawl work: one URL at one depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: u32,
}

impl CrawlTask {
    pub fn root(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    /// Builds the task for a link found on this task's page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// In-flight counter and the master artifact sender, under one lock
#[derive(Debug)]
struct InFlightInner {
    count: usize,
    sender: Option<mpsc::Sender<FileArtifact>>,
}

#[derive(Debug)]
struct InFlight {
    inner: Mutex<InFlightInner>,
}

impl InFlight {
    fn new(sender: mpsc::Sender<FileArtifact>) -> Self {
        Self {
            inner: Mutex::new(InFlightInner {
                count: 0,
                sender: Some(sender),
            }),
        }
    }

    /// Counts one more task and hands it a sender
    ///
    /// Returns None once the channel has been closed.
    fn register(&self) -> Option<mpsc::Sender<FileArtifact>> {
        let mut inner = self.inner.lock();
        let sender = inner.sender.as_ref()?.clone();
        inner.count += 1;
        Some(sender)
    }

    /// Counts one task as finished; the last one closes the channel
    fn complete(&self) {
        let mut inner = self.inner.lock();
        inner.count = inner.count.saturating_sub(1);
        if inner.count == 0 && inner.sender.take().is_some() {
            tracing::debug!("In-flight count reached zero, closing artifact channel");
        }
    }

    /// Closes the channel if nothing was ever registered
    fn close_if_idle(&self) {
        let mut inner = self.inner.lock();
        if inner.count == 0 && inner.sender.take().is_some() {
            tracing::debug!("No tasks in flight, closing artifact channel");
        }
    }

    fn count(&self) -> usize {
        self.inner.lock().count
    }

    fn is_closed(&self) -> bool {
        self.inner.lock().sender.is_none()
    }
}

/// Everything one crawl run shares between its tasks
struct Shared {
    config: CrawlConfig,
    frontier: Frontier,
    fetcher: Arc<dyn Fetcher>,
    semaphore: Arc<Semaphore>,
    in_flight: InFlight,
    counters: StatsCounters,
    state: Mutex<SupervisorState>,
    artifacts_rx: Mutex<Option<mpsc::Receiver<FileArtifact>>>,
}

impl Shared {
    /// Moves the supervisor to `next` if the transition is legal
    fn advance(&self, next: SupervisorState) -> bool {
        let mut state = self.state.lock();
        if state.can_transition_to(next) {
            tracing::debug!("Supervisor {} -> {}", *state, next);
            *state = next;
            true
        } else {
            false
        }
    }
}

/// Registration of one task in the in-flight counter
///
/// Dropping the slot drops the task's sender first, then decrements the counter,
/// so the channel can only close after every task sender is gone.
struct TaskSlot {
    shared: Arc<Shared>,
    sender: Option<mpsc::Sender<FileArtifact>>,
}

impl TaskSlot {
    fn register(shared: &Arc<Shared>) -> Option<Self> {
        let sender = shared.in_flight.register()?;
        Some(Self {
            shared: Arc::clone(shared),
            sender: Some(sender),
        })
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.sender.take();
        self.shared.in_flight.complete();
    }
}

/// Orchestrates one crawl run
///
/// Cloning a `Supervisor` yields another handle to the same run, which is how a
/// signal handler calls [`Supervisor::stop`] while [`Supervisor::run`] is in
/// progress.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sumi_mirror::config::CrawlConfig;
/// use sumi_mirror::crawler::{HttpFetcher, Supervisor};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CrawlConfig::new(Url::parse("https://example.com/")?, "./mirror");
/// let fetcher = Arc::new(HttpFetcher::with_timeout(None)?);
/// let supervisor = Supervisor::new(config, fetcher);
/// let stats = supervisor.run().await?;
/// println!("Fetched {} pages", stats.pages_fetched);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Supervisor {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    /// Creates a supervisor for one run; nothing starts until [`Supervisor::run`]
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let concurrency = config.concurrency.max(1);
        let (tx, rx) = mpsc::channel(concurrency * 2);

        let shared = Shared {
            frontier: Frontier::new(config.max_depth, config.max_pages),
            fetcher,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            in_flight: InFlight::new(tx),
            counters: StatsCounters::default(),
            state: Mutex::new(SupervisorState::Idle),
            artifacts_rx: Mutex::new(Some(rx)),
            config,
        };

        Self {
            shared: Arc::new(shared),
        }
    }

    /// Runs the crawl until every task has finished and every artifact is persisted
    ///
    /// Can be called once per supervisor; a second call fails with
    /// [`MirrorError::AlreadyStarted`].
    pub async fn run(&self) -> crate::Result<CrawlStats> {
        let rx = self
            .shared
            .artifacts_rx
            .lock()
            .take()
            .ok_or(MirrorError::AlreadyStarted)?;

        let started_at = Utc::now();
        self.shared.advance(SupervisorState::Running);

        let config = &self.shared.config;
        tracing::info!(
            "Mirroring {} into {} (max depth {}, max pages {}, concurrency {})",
            config.root_url,
            config.output_dir.display(),
            config.max_depth,
            config.max_pages,
            config.concurrency
        );

        let sink = PersistenceSink::new(&config.output_dir);
        let sink_handle = tokio::spawn(sink.drain(rx));

        let root = CrawlTask::root(config.root_url.clone());
        if self.shared.frontier.try_claim(&root.url, root.depth) {
            if let Some(slot) = TaskSlot::register(&self.shared) {
                tokio::spawn(run_task(slot, root));
            }
        } else {
            tracing::warn!("Root URL {} was not claimed, nothing to crawl", root.url);
        }
        self.shared.in_flight.close_if_idle();

        let report = sink_handle
            .await
            .map_err(|e| MirrorError::SinkTask(e.to_string()))?;

        self.shared.advance(SupervisorState::Drained);

        let counters = &self.shared.counters;
        let stats = CrawlStats {
            started_at,
            finished_at: Utc::now(),
            pages_claimed: self.shared.frontier.claimed_count() as u64,
            pages_fetched: counters.pages_fetched.load(Ordering::Relaxed),
            pages_failed: counters.pages_failed.load(Ordering::Relaxed),
            links_discovered: counters.links_discovered.load(Ordering::Relaxed),
            children_scheduled: counters.children_scheduled.load(Ordering::Relaxed),
            files_written: report.written,
            write_failures: report.failed,
            stopped_early: self.shared.frontier.is_stopped(),
        };

        tracing::info!(
            "Crawl drained: {} fetched, {} failed, {} files written in {:?}",
            stats.pages_fetched,
            stats.pages_failed,
            stats.files_written,
            stats.duration().to_std().unwrap_or_default()
        );

        Ok(stats)
    }

    /// Requests a graceful stop
    ///
    /// Idempotent and safe to call from any task. Every frontier claim fails from
    /// now on, so no new task starts; tasks already fetching run to completion and
    /// their artifacts are still persisted.
    pub fn stop(&self) {
        let was_stopped = self.shared.frontier.is_stopped();
        self.shared.frontier.stop();
        self.shared.advance(SupervisorState::Stopping);

        if !was_stopped {
            tracing::info!(
                "Stop requested, draining {} in-flight tasks",
                self.shared.in_flight.count()
            );
        }
    }

    /// Pre-seeds the frontier with filenames already present in the output directory
    pub fn preseed_existing<I>(&self, filenames: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.shared.frontier.seed_existing(filenames);
    }

    pub fn state(&self) -> SupervisorState {
        *self.shared.state.lock()
    }

    pub fn frontier(&self) -> &Frontier {
        &self.shared.frontier
    }

    /// Number of tasks registered and not yet finished
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.count()
    }

    /// Returns true once the artifact channel has been closed
    pub fn is_channel_closed(&self) -> bool {
        self.shared.in_flight.is_closed()
    }
}

/// Records a task state change
fn advance_task(task: &CrawlTask, state: &mut TaskState, next: TaskState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal task transition {} -> {}",
        state,
        next
    );
    tracing::trace!("[depth {}] {}: {} -> {}", task.depth, task.url, state, next);
    *state = next;
}

/// Processes one claimed task
///
/// Boxed so a task can spawn more tasks of the same type.
fn run_task(slot: TaskSlot, task: CrawlTask) -> TaskFuture {
    Box::pin(async move {
        let shared = Arc::clone(&slot.shared);
        let mut state = TaskState::Pending;
        advance_task(&task, &mut state, TaskState::Claimed);

        let _permit = match Arc::clone(&shared.semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                advance_task(&task, &mut state, TaskState::Failed);
                shared.counters.record_failed();
                return;
            }
        };

        if shared.frontier.is_stopped() {
            tracing::debug!("Crawl stopped before fetching {}", task.url);
            advance_task(&task, &mut state, TaskState::Failed);
            shared.counters.record_failed();
            return;
        }

        advance_task(&task, &mut state, TaskState::Fetching);
        let page = match shared.fetcher.download(&task.url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", task.url, e);
                advance_task(&task, &mut state, TaskState::Failed);
                shared.counters.record_failed();
                return;
            }
        };

        advance_task(&task, &mut state, TaskState::Fetched);
        shared.counters.record_fetched();
        tracing::info!(
            "Fetched [depth {}] {} ({} bytes)",
            task.depth,
            task.url,
            page.body.len()
        );

        // Relative links resolve against where the body was served from
        let links = if !is_html(page.content_type.as_deref()) {
            None
        } else if !same_origin(&page.final_url, &task.url) {
            tracing::debug!(
                "{} redirected off-origin to {}, not following its links",
                task.url,
                page.final_url
            );
            None
        } else {
            advance_task(&task, &mut state, TaskState::Extracting);
            Some(extract_links(&page.body, &page.final_url))
        };

        if let Some(sender) = slot.sender.as_ref() {
            let artifact = FileArtifact::new(task.url.clone(), page.body);
            if sender.send(artifact).await.is_err() {
                tracing::error!("Artifact channel closed early, dropping {}", task.url);
            }
        }

        let Some(links) = links else {
            advance_task(&task, &mut state, TaskState::Done);
            return;
        };

        advance_task(&task, &mut state, TaskState::SchedulingChildren);
        let mut scheduled = 0;
        if task.depth < shared.frontier.max_depth() {
            for link in &links {
                let child = task.child(link.clone());
                if !shared.frontier.try_claim(&child.url, child.depth) {
                    continue;
                }
                if let Some(child_slot) = TaskSlot::register(&shared) {
                    tokio::spawn(run_task(child_slot, child));
                    scheduled += 1;
                }
            }
        }
        shared.counters.record_links(links.len(), scheduled);
        tracing::debug!(
            "{}: {} links, {} new tasks",
            task.url,
            links.len(),
            scheduled
        );

        advance_task(&task, &mut state, TaskState::Done);
    })
}
