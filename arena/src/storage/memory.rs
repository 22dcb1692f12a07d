//! In-memory object store.

use super::{ObjectStore, StoredObject, check_path, errors::StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Object store kept in memory
pub struct MemoryObjectStore {
    public_base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> StorageResult<String> {
        check_path(path)?;
        self.objects.write().await.insert(
            path.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(format!("{}/{}", self.public_base_url.trim_end_matches('/'), path))
    }

    async fn get(&self, path: &str) -> StorageResult<Option<StoredObject>> {
        check_path(path)?;
        Ok(self.objects.read().await.get(path).cloned())
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        check_path(path)?;
        self.objects.write().await.remove(path);
        Ok(())
    }
}
