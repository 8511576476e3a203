//! Named invalidation topics.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::observability::metrics;

/// A change notification that cached views may care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Last transaction activity: an entry was added, updated or deleted.
    TransactionsChanged,
    /// Customer cache invalidated: balances or customer fields changed.
    CustomersChanged,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::TransactionsChanged => "transactionsChanged",
            Topic::CustomersChanged => "customersChanged",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest-value store for every topic plus the "needs data refresh" flag.
///
/// Each topic holds only the newest stamp, so concurrent writers resolve as
/// last write wins. Stamps never move backwards even if the wall clock does.
/// Nothing is cleared automatically; readers decide for themselves.
#[derive(Debug)]
pub struct InvalidationSignals {
    transactions: watch::Sender<Option<DateTime<Utc>>>,
    customers: watch::Sender<Option<DateTime<Utc>>>,
    needs_data_refresh: AtomicBool,
}

impl InvalidationSignals {
    pub fn new() -> Self {
        let (transactions, _) = watch::channel(None);
        let (customers, _) = watch::channel(None);
        Self {
            transactions,
            customers,
            needs_data_refresh: AtomicBool::new(false),
        }
    }

    /// Record a transaction entry mutation. Touches both topics, since
    /// customer balances derive from entries, and raises the refresh flag.
    pub fn transaction_mutated(&self) -> DateTime<Utc> {
        let stamp = self.touch(Topic::TransactionsChanged);
        self.touch(Topic::CustomersChanged);
        self.needs_data_refresh.store(true, Ordering::Release);
        stamp
    }

    /// Record a customer mutation.
    pub fn customer_mutated(&self) -> DateTime<Utc> {
        self.touch(Topic::CustomersChanged)
    }

    /// Stamp a topic with the current time and wake its subscribers.
    pub fn touch(&self, topic: Topic) -> DateTime<Utc> {
        let now = Utc::now();
        let mut stamped = now;
        self.sender(topic).send_modify(|slot| {
            stamped = match *slot {
                Some(previous) if previous > now => previous,
                _ => now,
            };
            *slot = Some(stamped);
        });
        metrics::record_invalidation(topic.as_str());
        tracing::debug!(topic = %topic, stamp = %stamped, "Invalidation signal raised");
        stamped
    }

    /// Newest stamp for a topic, if it was ever raised.
    pub fn last_changed(&self, topic: Topic) -> Option<DateTime<Utc>> {
        *self.sender(topic).borrow()
    }

    pub fn last_transaction_activity(&self) -> Option<DateTime<Utc>> {
        self.last_changed(Topic::TransactionsChanged)
    }

    pub fn customer_cache_invalidated(&self) -> Option<DateTime<Utc>> {
        self.last_changed(Topic::CustomersChanged)
    }

    /// Push-style access: the receiver resolves `changed()` on every stamp.
    pub fn subscribe(&self, topic: Topic) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.sender(topic).subscribe()
    }

    pub fn needs_data_refresh(&self) -> bool {
        self.needs_data_refresh.load(Ordering::Acquire)
    }

    /// Read and clear the refresh flag in one step.
    pub fn take_needs_data_refresh(&self) -> bool {
        self.needs_data_refresh.swap(false, Ordering::AcqRel)
    }

    pub fn clear_needs_data_refresh(&self) {
        self.needs_data_refresh.store(false, Ordering::Release);
    }

    fn sender(&self, topic: Topic) -> &watch::Sender<Option<DateTime<Utc>>> {
        match topic {
            Topic::TransactionsChanged => &self.transactions,
            Topic::CustomersChanged => &self.customers,
        }
    }
}

impl Default for InvalidationSignals {
    fn default() -> Self {
        Self::new()
    }
}
