//! Document store error types.

use std::time::Duration;
use thiserror::Error;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Document body could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Insert on an id that already exists
    #[error("Document {collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    /// Document does not exist
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// Compare-and-swap lost against a concurrent writer
    #[error("Document {collection}/{id} changed since version {expected}")]
    VersionConflict {
        collection: String,
        id: String,
        expected: i64,
    },

    /// Too many concurrent writers on one document
    #[error("Document {collection}/{id} is busy, gave up after {attempts} attempts")]
    Contention {
        collection: String,
        id: String,
        attempts: usize,
    },

    /// Backend did not answer in time
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    /// Get a client-safe error message
    ///
    /// Backend details (SQL errors, document paths) are not exposed.
    pub fn client_message(&self) -> String {
        match self {
            StoreError::Contention { .. } => "Too many concurrent updates, please retry".to_string(),
            StoreError::Timeout(_) => "The service is busy, please retry".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
