//! Filesystem-backed object store.
//!
//! Objects are written below a root directory; the content type is kept in a
//! sidecar `<name>.meta` file so `get` can serve it back.

use super::{
    IMAGE_TYPES, ObjectStore, StoredObject, check_path,
    errors::{StorageError, StorageResult},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

const META_SUFFIX: &str = ".meta";

/// Object store on the local filesystem
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`, serving URLs under `public_base_url`
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn meta_path(file: &Path) -> PathBuf {
        let mut name = file.as_os_str().to_owned();
        name.push(META_SUFFIX);
        PathBuf::from(name)
    }

    fn is_sidecar(path: &str) -> bool {
        path.ends_with(META_SUFFIX)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> StorageResult<String> {
        check_path(path)?;
        if Self::is_sidecar(path) {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        let file = self.root.join(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&file, &bytes).await?;
        fs::write(Self::meta_path(&file), content_type.as_bytes()).await?;

        log::debug!("Stored {} bytes at {}", bytes.len(), file.display());
        Ok(format!("{}/{}", self.public_base_url.trim_end_matches('/'), path))
    }

    async fn get(&self, path: &str) -> StorageResult<Option<StoredObject>> {
        check_path(path)?;
        // Sidecars are bookkeeping, not objects
        if Self::is_sidecar(path) {
            return Ok(None);
        }
        let file = self.root.join(path);
        let bytes = match fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let content_type = match fs::read_to_string(Self::meta_path(&file)).await {
            Ok(content_type) => content_type,
            // Fall back to the extension when the sidecar is missing
            Err(_) => file
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(|ext| IMAGE_TYPES.iter().find(|(_, known)| *known == ext))
                .map(|(mime, _)| mime.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        };

        Ok(Some(StoredObject {
            content_type,
            bytes,
        }))
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        check_path(path)?;
        if Self::is_sidecar(path) {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        let file = self.root.join(path);
        for target in [Self::meta_path(&file), file] {
            match fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
