//! Event log sink.
//!
//! Every action taken or discrepancy found during reconciliation is narrated
//! to an [`EventLog`]. Logging is fire-and-forget: the trait cannot fail, so
//! a broken sink can never abort a merge.

use parking_lot::Mutex;

/// Sink for human-readable reconciliation events.
pub trait EventLog: Send + Sync {
    /// Record one event under a category (`"Merge"` or `"Diff"`).
    fn log(&self, message: &str, category: &str);
}

/// Event log that emits through `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventLog;

impl EventLog for TracingEventLog {
    fn log(&self, message: &str, category: &str) {
        tracing::info!(target: "reconcile_kernel::events", category, "{message}");
    }
}

/// One captured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// The human-readable message.
    pub message: String,
    /// The category it was logged under.
    pub category: String,
}

/// Event log that records entries in memory, for assertions in tests and for
/// callers that want to present the merge narrative afterwards.
#[derive(Debug, Default)]
pub struct CapturingEventLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl CapturingEventLog {
    /// Create an empty capturing log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries captured so far, in emission order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Messages only, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.message.clone()).collect()
    }
}

impl EventLog for CapturingEventLog {
    fn log(&self, message: &str, category: &str) {
        self.entries.lock().push(LogEntry {
            message: message.to_string(),
            category: category.to_string(),
        });
    }
}
