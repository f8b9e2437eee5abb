//! Shared types used by the reconciliation engine.

use std::fmt;
use std::time::Duration;

/// Opaque reference to one displayed message, issued by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayHandle(pub i64);

impl fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single change to a subscriber's view, in the order it must be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOperation {
    Delete {
        identity: String,
        handle: DisplayHandle,
    },
    Create {
        identity: String,
        text: String,
    },
    Update {
        identity: String,
        handle: DisplayHandle,
        text: String,
    },
}

impl DisplayOperation {
    pub fn identity(&self) -> &str {
        match self {
            DisplayOperation::Delete { identity, .. }
            | DisplayOperation::Create { identity, .. }
            | DisplayOperation::Update { identity, .. } => identity,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DisplayOperation::Delete { .. } => "delete",
            DisplayOperation::Create { .. } => "create",
            DisplayOperation::Update { .. } => "update",
        }
    }
}

/// Timing knobs for the monitor loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Pause between the end of one cycle and the start of the next.
    pub poll_interval: Duration,

    /// Fetches slower than this are reported on the `performance` target.
    pub slow_fetch: Duration,

    /// Same for individual sink calls.
    pub slow_sink_call: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            slow_fetch: Duration::from_secs(5),
            slow_sink_call: Duration::from_secs(2),
        }
    }
}

/// Counts of what applying one subscriber's operations achieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl ApplyOutcome {
    pub fn merge(&mut self, other: ApplyOutcome) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.failed += other.failed;
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.deleted + self.failed
    }
}

/// Summary of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub depth: usize,
    pub items: usize,
    pub subscribers: usize,
    pub fetch_failed: bool,

    /// Subscriber tasks that panicked and were skipped.
    pub panicked: usize,

    pub outcome: ApplyOutcome,
}
