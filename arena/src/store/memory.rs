//! In-process document store.

use super::{
    CHANGE_FEED_CAPACITY, ChangeKind, Document, DocumentChange, DocumentStore, Filter,
    errors::{StoreError, StoreResult},
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{RwLock, broadcast};

type Collection = BTreeMap<String, Document>;

/// Document store kept entirely in memory
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    changes: broadcast::Sender<DocumentChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            collections: RwLock::new(HashMap::new()),
            changes,
        }
    }

    fn publish(&self, collection: &str, id: &str, kind: ChangeKind, document: Option<Document>) {
        // No receivers is fine
        let _ = self.changes.send(DocumentChange {
            collection: collection.to_string(),
            id: id.to_string(),
            kind,
            document,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn insert(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document> {
        let document = {
            let mut collections = self.collections.write().await;
            let documents = collections.entry(collection.to_string()).or_default();
            if documents.contains_key(id) {
                return Err(StoreError::AlreadyExists {
                    collection: collection.to_string(),
                    id: id.to_string(),
                });
            }

            let document = Document {
                id: id.to_string(),
                version: 1,
                data,
                updated_at: Utc::now(),
            };
            documents.insert(id.to_string(), document.clone());
            document
        };

        self.publish(collection, id, ChangeKind::Created, Some(document.clone()));
        Ok(document)
    }

    async fn put(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document> {
        let (document, kind) = {
            let mut collections = self.collections.write().await;
            let documents = collections.entry(collection.to_string()).or_default();
            let (version, kind) = match documents.get(id) {
                Some(existing) => (existing.version + 1, ChangeKind::Updated),
                None => (1, ChangeKind::Created),
            };

            let document = Document {
                id: id.to_string(),
                version,
                data,
                updated_at: Utc::now(),
            };
            documents.insert(id.to_string(), document.clone());
            (document, kind)
        };

        self.publish(collection, id, kind, Some(document.clone()));
        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        expected_version: i64,
    ) -> StoreResult<Document> {
        let document = {
            let mut collections = self.collections.write().await;
            let existing = collections
                .get_mut(collection)
                .and_then(|documents| documents.get_mut(id))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;

            if existing.version != expected_version {
                return Err(StoreError::VersionConflict {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    expected: expected_version,
                });
            }

            existing.version += 1;
            existing.data = data;
            existing.updated_at = Utc::now();
            existing.clone()
        };

        self.publish(collection, id, ChangeKind::Updated, Some(document.clone()));
        Ok(document)
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let removed = {
            let mut collections = self.collections.write().await;
            collections
                .get_mut(collection)
                .and_then(|documents| documents.remove(id))
                .is_some()
        };

        if removed {
            self.publish(collection, id, ChangeKind::Deleted, None);
        }
        Ok(removed)
    }

    async fn list(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| filter.matches(&document.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentChange> {
        self.changes.subscribe()
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
