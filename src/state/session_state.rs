//! Session state definitions for tracking crawl progress
use std::fmt;

/// Lifecycle states of a crawl session
///
/// A session moves strictly forward: `Idle → Running → Draining → Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionState {
    /// Constructed; no renderer acquired yet
    Idle,

    /// Renderer acquired, base URL enqueued, workers being issued
    Running,

    /// Frontier observed empty (or page cap hit); waiting on in-flight workers
    Draining,

    /// Terminal; no visit in flight, product set frozen. The renderer is shut
    /// down by the session's owner afterwards.
    Done,
}

impl SessionState {
    /// Checks whether a transition to `next` is allowed
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
