//! Remote store gateway.
//!
//! # Data Flow
//! ```text
//! Screen calls a gateway operation
//!     → input validation (never retried)
//!     → health monitor: throttle delay when unhealthy and stale
//!     → retry policy: attempts under the timeout guard
//!     → record_success() / record_failure()
//!     → on a successful mutation: invalidation signals
//! ```
//!
//! # Design Decisions
//! - One method per entity operation; no cross-entity transactions
//! - No locking; racing mutations resolve in the store, signals are last write wins
//! - A timeout means "outcome unknown", not "nothing happened"

mod bulk;
mod customers;
mod entries;
mod profiles;

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::observability::metrics;
use crate::store::{Document, DocumentStore, Snapshot, StoreError};

pub const CUSTOMERS: &str = "customers";
pub const TRANSACTION_ENTRIES: &str = "transaction_entries";
pub const PROFILES: &str = "profiles";

/// Page size for the customer list.
pub const CUSTOMER_PAGE_LIMIT: usize = 30;

/// Typed, resilient access to the ledger collections.
pub struct Gateway<S: ?Sized> {
    store: Arc<S>,
    ctx: SyncContext,
}

impl<S: ?Sized> Clone for Gateway<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ctx: self.ctx.clone(),
        }
    }
}

impl<S: DocumentStore + ?Sized> Gateway<S> {
    pub fn new(store: Arc<S>, ctx: SyncContext) -> Self {
        Self { store, ctx }
    }

    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run one store primitive with throttling, retries and health bookkeeping.
    async fn execute<T, F, Fut>(&self, operation: &'static str, op: F) -> SyncResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let health = self.ctx.health();
        if health.should_throttle() {
            let delay = self.ctx.config().health.throttle_delay();
            tracing::info!(operation, delay = ?delay, "Throttling store call due to connection health");
            metrics::record_throttled(operation);
            tokio::time::sleep(delay).await;
        }

        match self.ctx.retry_policy().run(operation, op).await {
            Ok(value) => {
                health.record_success();
                metrics::record_operation(operation, true);
                Ok(value)
            }
            Err(e) => {
                health.record_failure();
                metrics::record_operation(operation, false);
                tracing::error!(operation, class = %e.class(), error = %e, "Store operation failed");
                Err(e)
            }
        }
    }
}

/// Document body with the timestamps the gateway maintains.
#[derive(Serialize)]
struct Stamped<'a, T> {
    #[serde(flatten)]
    fields: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl<'a, T> Stamped<'a, T> {
    fn created(fields: &'a T, now: DateTime<Utc>) -> Self {
        Self {
            fields,
            created_at: Some(now),
            updated_at: now,
        }
    }

    fn updated(fields: &'a T, now: DateTime<Utc>) -> Self {
        Self {
            fields,
            created_at: None,
            updated_at: now,
        }
    }
}

fn to_document<T: Serialize>(value: &T) -> SyncResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(SyncError::Validation(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn decode<T: DeserializeOwned>(id: String, mut data: Document) -> SyncResult<T> {
    data.insert("id".to_string(), Value::String(id));
    Ok(serde_json::from_value(Value::Object(data))?)
}

/// Decode query results, skipping documents that do not fit the model.
fn decode_all<T: DeserializeOwned>(collection: &str, snapshots: Vec<Snapshot>) -> Vec<T> {
    snapshots
        .into_iter()
        .filter_map(|snapshot| {
            let id = snapshot.id.clone();
            match decode(snapshot.id, snapshot.data) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(collection, id = %id, error = %e, "Skipping malformed document");
                    None
                }
            }
        })
        .collect()
}

fn require_id(field: &str, value: &str) -> SyncResult<()> {
    if value.trim().is_empty() {
        Err(SyncError::Validation(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stamped_created_document() {
        let now = Utc::now();
        let fields = json!({"name": "Ram", "id": "ignored"});
        let doc = to_document(&Stamped::created(&fields, now)).unwrap();

        assert_eq!(doc["name"], "Ram");
        assert!(doc.contains_key("created_at"));
        assert!(doc.contains_key("updated_at"));
        assert!(!doc.contains_key("id"));
    }

    #[test]
    fn test_stamped_update_has_no_created_at() {
        let fields = json!({"phone": "98"});
        let doc = to_document(&Stamped::updated(&fields, Utc::now())).unwrap();
        assert!(!doc.contains_key("created_at"));
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_decode_all_skips_malformed() {
        #[derive(serde::Deserialize)]
        struct Named {
            id: String,
            name: String,
        }

        let good = json!({"name": "Sita"}).as_object().cloned().unwrap();
        let bad = json!({"title": 4}).as_object().cloned().unwrap();
        let decoded: Vec<Named> = decode_all(
            "customers",
            vec![
                Snapshot { id: "a".into(), data: good },
                Snapshot { id: "b".into(), data: bad },
            ],
        );

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].id, "a");
        assert_eq!(decoded[0].name, "Sita");
    }
}
