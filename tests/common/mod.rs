//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use karobar_sync::config::{Platform, SyncConfig};
use karobar_sync::store::{Document, DocumentStore, MemoryStore, Query, Snapshot, StoreError};
use karobar_sync::{Gateway, SyncContext};

/// Store primitive a fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Get,
    Set,
    Update,
    Delete,
    Query,
    Ping,
}

#[derive(Debug, Clone)]
pub enum Fault {
    /// Return this error instead of calling the store.
    Fail(StoreError),
    /// Sleep before calling the store.
    Stall(Duration),
}

#[derive(Debug, Clone, Copy)]
enum When {
    Always,
    FirstN(u32),
    Nth(u32),
}

#[derive(Debug, Clone)]
struct Rule {
    op: Op,
    collection: Option<String>,
    when: When,
    fault: Fault,
}

/// In-memory store with scripted faults.
///
/// Calls are counted per operation and per (operation, collection); rules
/// scoped to a collection use the per-collection count.
pub struct FaultyStore {
    inner: MemoryStore,
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<HashMap<(Op, Option<String>), u32>>,
    total: AtomicU32,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(None),
            rules: Mutex::new(Vec::new()),
            calls: Mutex::new(HashMap::new()),
            total: AtomicU32::new(0),
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Every call to `op` fails.
    pub fn fail(&self, op: Op, error: StoreError) {
        self.push(op, None, When::Always, Fault::Fail(error));
    }

    /// The first `n` calls to `op` fail, later ones go through.
    pub fn fail_times(&self, op: Op, n: u32, error: StoreError) {
        self.push(op, None, When::FirstN(n), Fault::Fail(error));
    }

    /// Only the `nth` (1-based) call to `op` on `collection` fails.
    pub fn fail_nth(&self, op: Op, collection: &str, nth: u32, error: StoreError) {
        self.push(op, Some(collection.to_string()), When::Nth(nth), Fault::Fail(error));
    }

    /// Every call to `op` sleeps before going through.
    pub fn stall(&self, op: Op, delay: Duration) {
        self.push(op, None, When::Always, Fault::Stall(delay));
    }

    pub fn clear_faults(&self) {
        self.rules.lock().unwrap().clear();
    }

    /// Calls made to `op`, across collections.
    pub fn calls(&self, op: Op) -> u32 {
        self.calls.lock().unwrap().get(&(op, None)).copied().unwrap_or(0)
    }

    /// Calls made to `op` on one collection.
    pub fn calls_in(&self, op: Op, collection: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(&(op, Some(collection.to_string())))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.total.load(Ordering::SeqCst)
    }

    fn push(&self, op: Op, collection: Option<String>, when: When, fault: Fault) {
        self.rules.lock().unwrap().push(Rule {
            op,
            collection,
            when,
            fault,
        });
    }

    /// Count the call and return the fault scripted for it, if any.
    fn intercept(&self, op: Op, collection: &str) -> Option<Fault> {
        self.total.fetch_add(1, Ordering::SeqCst);
        let (op_count, collection_count) = {
            let mut calls = self.calls.lock().unwrap();
            let op_count = {
                let count = calls.entry((op, None)).or_insert(0);
                *count += 1;
                *count
            };
            let count = calls.entry((op, Some(collection.to_string()))).or_insert(0);
            *count += 1;
            (op_count, *count)
        };

        let rules = self.rules.lock().unwrap();
        rules
            .iter()
            .find(|rule| {
                if rule.op != op {
                    return false;
                }
                let n = match &rule.collection {
                    Some(c) if c != collection => return false,
                    Some(_) => collection_count,
                    None => op_count,
                };
                match rule.when {
                    When::Always => true,
                    When::FirstN(limit) => n <= limit,
                    When::Nth(nth) => n == nth,
                }
            })
            .map(|rule| rule.fault.clone())
    }

    async fn apply(&self, op: Op, collection: &str) -> Result<(), StoreError> {
        match self.intercept(op, collection) {
            Some(Fault::Fail(error)) => Err(error),
            Some(Fault::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn add(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        self.apply(Op::Add, collection).await?;
        self.inner.add(collection, doc).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.apply(Op::Get, collection).await?;
        self.inner.get(collection, id).await
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        merge: bool,
    ) -> Result<(), StoreError> {
        self.apply(Op::Set, collection).await?;
        self.inner.set(collection, id, doc, merge).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<(), StoreError> {
        self.apply(Op::Update, collection).await?;
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.apply(Op::Delete, collection).await?;
        self.inner.delete(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        self.apply(Op::Query, &query.collection).await?;
        self.inner.query(query).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.apply(Op::Ping, "").await?;
        self.inner.ping().await
    }
}

/// Gateway over a fresh faulty store using the given platform profile.
pub fn gateway(platform: Platform) -> (Gateway<FaultyStore>, Arc<FaultyStore>) {
    gateway_with(SyncConfig {
        platform,
        ..Default::default()
    })
}

pub fn gateway_with(config: SyncConfig) -> (Gateway<FaultyStore>, Arc<FaultyStore>) {
    let store = Arc::new(FaultyStore::new());
    let gateway = Gateway::new(Arc::clone(&store), SyncContext::new(config));
    (gateway, store)
}

pub fn timed_out() -> StoreError {
    StoreError::new("Request timed out")
}

pub fn network_error() -> StoreError {
    StoreError::new("TypeError: Failed to fetch")
}

pub fn permission_denied() -> StoreError {
    StoreError::with_code("permission-denied", "Missing or insufficient permissions.")
}
