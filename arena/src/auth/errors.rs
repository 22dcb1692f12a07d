//! Authentication error types.

use crate::{profile::ProfileError, store::StoreError};
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Document store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Profile could not be created
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Password verification failed
    #[error("Invalid password")]
    InvalidPassword,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Email already exists
    #[error("Email already exists")]
    EmailTaken,

    /// Invalid email format
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too weak
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// Upstream identity is incomplete
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// Federated identity token missing, forged or expired
    #[error("Identity could not be verified")]
    UnverifiedIdentity,

    /// No federation secret configured
    #[error("Federated sign-in is not enabled")]
    FederationDisabled,

    /// JWT token error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Session expired
    #[error("Session expired")]
    SessionExpired,

    /// Invalid refresh token
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Store and JWT errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Store(e) => e.client_message(),
            AuthError::Profile(e) => e.client_message(),
            AuthError::JwtError(_) => "Authentication failed".to_string(),
            // Same answer for unknown user and wrong password
            AuthError::UserNotFound | AuthError::InvalidPassword => {
                "Invalid email or password".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
