//! In-process document store with JSON file persistence.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::store::{compare_values, Direction, Document, DocumentStore, Query, Snapshot, StoreError};

/// A thread-safe document store keyed by (collection, id).
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<(String, String), Document>>,
    persistence_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
        }
    }

    /// Load from file if it exists; the file becomes the save target.
    pub fn load_from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let file = File::open(path)?;
            let reader = BufReader::new(file);
            let collections: HashMap<String, HashMap<String, Document>> =
                serde_json::from_reader(reader)?;

            for (collection, docs) in collections {
                for (id, doc) in docs {
                    store.inner.insert((collection.clone(), id), doc);
                }
            }
            tracing::info!(path = %path.display(), documents = store.inner.len(), "Loaded document store");
        }
        Ok(store)
    }

    /// Save to the persistence file, if one is configured.
    pub fn save_to_file(&self) -> std::io::Result<()> {
        if let Some(path) = &self.persistence_path {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);

            // Sorted so the file diffs cleanly between saves.
            let mut collections: BTreeMap<String, BTreeMap<String, Document>> = BTreeMap::new();
            for r in self.inner.iter() {
                let (collection, id) = r.key();
                collections
                    .entry(collection.clone())
                    .or_default()
                    .insert(id.clone(), r.value().clone());
            }

            serde_json::to_writer_pretty(writer, &collections)?;
            tracing::info!(path = %path.display(), documents = self.inner.len(), "Saved document store");
        }
        Ok(())
    }

    /// Total documents across all collections.
    pub fn count(&self) -> usize {
        self.inner.len()
    }

    /// Documents in one collection.
    pub fn count_in(&self, collection: &str) -> usize {
        self.inner.iter().filter(|r| r.key().0 == collection).count()
    }

    fn key(collection: &str, id: &str) -> (String, String) {
        (collection.to_string(), id.to_string())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(&self, collection: &str, doc: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.inner.insert(Self::key(collection, &id), doc);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .inner
            .get(&Self::key(collection, id))
            .map(|r| r.value().clone()))
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        merge: bool,
    ) -> Result<(), StoreError> {
        let mut entry = self.inner.entry(Self::key(collection, id)).or_default();
        if merge {
            entry.extend(doc);
        } else {
            *entry = doc;
        }
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<(), StoreError> {
        match self.inner.get_mut(&Self::key(collection, id)) {
            Some(mut existing) => {
                existing.extend(fields);
                Ok(())
            }
            None => {
                tracing::debug!(collection, id, "Update of missing document");
                Err(StoreError::not_found())
            }
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.remove(&Self::key(collection, id));
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let mut results: Vec<Snapshot> = self
            .inner
            .iter()
            .filter(|r| r.key().0 == query.collection && query.matches(r.value()))
            .map(|r| Snapshot {
                id: r.key().1.clone(),
                data: r.value().clone(),
            })
            .collect();

        if let Some((field, direction)) = &query.order_by {
            results.sort_by(|a, b| {
                let ord = compare_values(a.data.get(field), b.data.get(field));
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            results.truncate(limit);
        }

        Ok(results)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
