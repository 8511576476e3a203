//! Remote document store boundary.
//!
//! The store itself (its indexing, persistence and query engine) lives outside
//! this crate. The gateway only needs the primitives below: add/get/set/update/
//! delete a document by id, and equality-filtered queries with an optional
//! order and limit.

pub mod memory;

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;

/// A document body: a JSON object without its id.
pub type Document = serde_json::Map<String, Value>;

/// A document together with its id, as returned by queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub data: Document,
}

/// Failure reported by a store primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.code, .message))]
pub struct StoreError {
    /// Machine-readable code, e.g. `not-found` or `permission-denied`.
    pub code: Option<String>,
    pub message: String,
}

fn render(code: &Option<String>, message: &str) -> String {
    match code {
        Some(code) => format!("{}: {}", code, message),
        None => message.to_string(),
    }
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Missing-document error. The id stays out of the message so it
    /// cannot influence classification.
    pub fn not_found() -> Self {
        Self::with_code("not-found", "No document to update")
    }
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// An equality-filtered query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document satisfies every filter.
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }
}

/// Order two field values the way a document store would.
///
/// RFC 3339 timestamps compare chronologically, numbers numerically and
/// everything else by its JSON text. Missing values sort first.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                chrono::DateTime::parse_from_rfc3339(x),
                chrono::DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Primitive operations of the remote document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document under a generated id and return the id.
    async fn add(&self, collection: &str, doc: Document) -> Result<String, StoreError>;

    /// Fetch a document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Write a document by id. With `merge`, top-level fields are replaced
    /// individually and unmentioned fields survive.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Replace the given top-level fields of an existing document.
    /// Fails with code `not-found` when the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<(), StoreError>;

    /// Delete a document by id. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Run an equality-filtered query.
    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError>;

    /// Cheap round trip used by the connection check.
    async fn ping(&self) -> Result<(), StoreError>;
}
