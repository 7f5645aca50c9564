use std::fmt;

/// Lifecycle of one crawl supervisor
///
/// A supervisor runs at most once: `Idle -> Running -> (Stopping) -> Drained`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupervisorState {
    /// Constructed, not started
    Idle,

    /// Tasks are being claimed and fetched
    Running,

    /// Stop was requested; in-flight tasks finish, no new claims succeed
    Stopping,

    /// Artifact channel closed and every artifact persisted
    Drained,
}

impl SupervisorState {
    /// Checks whether moving from this state to `next` is a legal transition
    pub fn can_transition_to(&self, next: SupervisorState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Stopping)
                | (Self::Running, Self::Stopping)
                | (Self::Running, Self::Drained)
                | (Self::Stopping, Self::Drained)
        )
    }

    /// Returns true once the run is over
    pub fn is_drained(&self) -> bool {
        matches!(self, Self::Drained)
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Drained => "drained",
        };
        write!(f, "{}", label)
    }
}
