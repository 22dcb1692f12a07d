//! Object storage for user-uploaded images (avatars, tournament banners).
//!
//! Uploads are validated against per-kind size and content-type limits
//! before they reach the backend. A successful upload returns the public URL
//! under which the object can be fetched again.

pub mod errors;
pub mod local;
pub mod memory;

pub use errors::{StorageError, StorageResult};
pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Accepted image content types and their file extensions
pub const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Kind of upload, each with its own limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Avatar,
    Banner,
}

impl UploadKind {
    /// Largest accepted upload in bytes
    pub fn max_bytes(self) -> usize {
        match self {
            UploadKind::Avatar => 2 * 1024 * 1024,
            UploadKind::Banner => 5 * 1024 * 1024,
        }
    }

    /// Path prefix in the object store
    pub fn prefix(self) -> &'static str {
        match self {
            UploadKind::Avatar => "avatars",
            UploadKind::Banner => "banners",
        }
    }
}

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Check an upload against the limits of its kind
///
/// Returns the file extension for the content type.
pub fn validate_upload(kind: UploadKind, content_type: &str, len: usize) -> StorageResult<&'static str> {
    let extension = IMAGE_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(content_type.trim()))
        .map(|(_, ext)| *ext)
        .ok_or_else(|| StorageError::UnsupportedType(content_type.to_string()))?;

    if len == 0 {
        return Err(StorageError::Empty);
    }

    if len > kind.max_bytes() {
        return Err(StorageError::TooLarge {
            size: len,
            max: kind.max_bytes(),
        });
    }

    Ok(extension)
}

/// Build the object path for an upload owned by `owner`
pub fn object_path(kind: UploadKind, owner: &str, extension: &str) -> String {
    format!(
        "{}/{}/{}.{}",
        kind.prefix(),
        owner,
        uuid::Uuid::new_v4(),
        extension
    )
}

/// Blob storage returning retrievable URLs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object and return its public URL
    async fn put(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> StorageResult<String>;

    /// Fetch an object
    async fn get(&self, path: &str) -> StorageResult<Option<StoredObject>>;

    /// Remove an object; missing objects are not an error
    async fn delete(&self, path: &str) -> StorageResult<()>;
}

/// Reject paths that could escape the store root
pub(crate) fn check_path(path: &str) -> StorageResult<()> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}
