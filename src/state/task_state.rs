/// Task state definitions for tracking crawl progress
///
/// This module defines every state a crawl task moves through, from discovery to
/// its terminal outcome.
use std::fmt;

/// Represents the current state of a single crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task exists but its URL has not been claimed yet
    Pending,

    /// URL has been claimed in the frontier; no other task will process it
    Claimed,

    /// HTTP request is in progress
    Fetching,

    /// Body received and handed to the persistence sink
    Fetched,

    /// Links are being extracted from the body
    Extracting,

    /// Extracted links are being claimed and spawned as child tasks
    SchedulingChildren,

    // ===== Terminal States =====
    /// Task finished successfully
    Done,

    /// Fetch failed or the crawl stopped before the fetch was issued
    Failed,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Checks whether moving from this state to `next` is a legal transition
    ///
    /// ```text
    /// Pending -> Claimed -> Fetching -> Fetched -> Extracting -> SchedulingChildren -> Done
    ///               |           |
    ///               +-----------+--> Failed
    /// ```
    ///
    /// A task may also go straight from `Fetched` to `Done` when the body is not
    /// HTML and there is nothing to extract.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Claimed)
                | (Self::Claimed, Self::Fetching)
                | (Self::Claimed, Self::Failed)
                | (Self::Fetching, Self::Fetched)
                | (Self::Fetching, Self::Failed)
                | (Self::Fetched, Self::Extracting)
                | (Self::Fetched, Self::Done)
                | (Self::Extracting, Self::SchedulingChildren)
                | (Self::SchedulingChildren, Self::Done)
        )
    }

    /// Returns a short lowercase label for log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Fetching => "fetching",
            Self::Fetched => "fetched",
            Self::Extracting => "extracting",
            Self::SchedulingChildren => "scheduling_children",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible task states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Claimed,
            Self::Fetching,
            Self::Fetched,
            Self::Extracting,
            Self::SchedulingChildren,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
