//! Object storage error types.

use thiserror::Error;

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Content type not accepted
    #[error("Unsupported file type: {0}. Use a JPEG, PNG, WebP or GIF image")]
    UnsupportedType(String),

    /// Upload exceeds the size limit
    #[error("File is too large: {size} bytes (maximum {max} bytes)")]
    TooLarge { size: usize, max: usize },

    /// Upload has no content
    #[error("File is empty")]
    Empty,

    /// Path is not a plain relative path
    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    /// Filesystem error
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            StorageError::Io(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
