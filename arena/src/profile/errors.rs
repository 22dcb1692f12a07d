//! Profile error types.

use crate::{storage::StorageError, store::StoreError};
use thiserror::Error;

/// Profile errors
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Document store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Field rejected by validation
    #[error("{0}")]
    Validation(String),

    /// IGN already used by another player
    #[error("This IGN is already taken")]
    IgnTaken,

    /// Game ID already linked to another player
    #[error("This game ID is already registered")]
    GameIdTaken,

    /// Profile not found
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// Avatar upload failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ProfileError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            ProfileError::Store(e) => e.client_message(),
            ProfileError::Storage(e) => e.client_message(),
            ProfileError::NotFound(_) => "Profile not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;
