//! Per-reader staleness checks.

use chrono::{DateTime, Utc};

use crate::invalidation::signals::{InvalidationSignals, Topic};

/// Remembers when a screen last fetched a topic's data.
///
/// Each reader keeps its own watermark, so one screen refetching never
/// hides a change from another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheWatermark {
    fetched_at: Option<DateTime<Utc>>,
}

impl CacheWatermark {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Record a completed fetch. Should be stamped before the fetch started so
    /// that a mutation racing the fetch still counts as newer.
    pub fn mark_fetched(&mut self, at: DateTime<Utc>) {
        self.fetched_at = Some(at);
    }

    /// Whether the topic changed at or after our last fetch. Never fetched
    /// means stale.
    pub fn is_stale(&self, signals: &InvalidationSignals, topic: Topic) -> bool {
        match (self.fetched_at, signals.last_changed(topic)) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(fetched), Some(changed)) => changed >= fetched,
        }
    }
}
