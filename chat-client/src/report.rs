//! Failure reporting hook.
//!
//! The session never surfaces failures itself; it hands them to a
//! [`FailureReporter`] supplied by the application (a toast, a status bar,
//! a log line) and leaves local state at its last good value.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::session::ClientError;

/// The operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Fetching the peer directory and unseen snapshot.
    LoadRoster,
    /// Fetching one conversation's history.
    LoadHistory,
    /// Sending a message.
    SendMessage,
    /// Marking a pushed message as read.
    AcknowledgeRead,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::LoadRoster => "load roster",
            Operation::LoadHistory => "load history",
            Operation::SendMessage => "send message",
            Operation::AcknowledgeRead => "acknowledge read",
        };
        f.write_str(name)
    }
}

/// User-visible failure channel.
pub trait FailureReporter: Send + Sync {
    /// Report a failed operation.
    fn report(&self, operation: Operation, error: &ClientError);
}

/// Reporter that logs failures with `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, operation: Operation, error: &ClientError) {
        tracing::warn!("{} failed: {}", operation, error);
    }
}

/// Reporter that keeps every failure for later inspection.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    failures: Arc<Mutex<Vec<(Operation, String)>>>,
}

impl CollectingReporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures reported so far, as (operation, message).
    pub fn failures(&self) -> Vec<(Operation, String)> {
        self.failures
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    /// True when nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.failures().is_empty()
    }
}

impl FailureReporter for CollectingReporter {
    fn report(&self, operation: Operation, error: &ClientError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push((operation, error.to_string()));
        }
    }
}
