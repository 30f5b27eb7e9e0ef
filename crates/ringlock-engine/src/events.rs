//! Diagnostic event log.
//!
//! A fixed-capacity ring buffer of timestamped events. Overwriting the
//! oldest entry is silent: the log exists for at-a-glance diagnostics, not
//! as an audit trail, and loss of old entries is accepted.

use chrono::{DateTime, Utc};
use ringlock_core::{EventKind, constants::EVENT_LOG_CAPACITY};
use serde::Serialize;
use std::collections::VecDeque;

/// A single logged event. Immutable once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,

    /// What happened.
    pub kind: EventKind,
}

/// Fixed-capacity circular event log.
///
/// # Examples
///
/// ```
/// use ringlock_engine::events::EventLog;
/// use ringlock_core::EventKind;
///
/// let mut log = EventLog::new();
/// log.record(EventKind::Bell);
/// log.record(EventKind::Unlocked);
///
/// let kinds: Vec<_> = log.iter().map(|entry| entry.kind).collect();
/// assert_eq!(kinds, vec![EventKind::Bell, EventKind::Unlocked]);
/// ```
#[derive(Debug)]
pub struct EventLog {
    entries: VecDeque<EventRecord>,
}

impl EventLog {
    /// Create an empty log with capacity [`EVENT_LOG_CAPACITY`].
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
        }
    }

    /// Record an event at the current wall-clock time, silently
    /// overwriting the oldest entry when full.
    pub fn record(&mut self, kind: EventKind) {
        if self.entries.len() == EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(EventRecord {
            timestamp: Utc::now(),
            kind,
        });
    }

    /// Number of stored entries (at most the fixed capacity).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.entries.iter()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
