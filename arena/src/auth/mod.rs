//! Authentication module providing registration, sign-in and session management.
//!
//! This module implements:
//! - Email/password accounts with Argon2id password hashing and a server-side pepper
//! - Anonymous (guest) sign-in
//! - Federated sign-in from an identity token signed with a shared federation secret
//! - JWT access tokens (15-minute expiry)
//! - Rotating refresh tokens (7-day expiry) bound to a device fingerprint
//!
//! Every new account also gets a player profile.
//!
//! ## Example
//!
//! ```
//! use arena::auth::{AuthManager, LoginRequest, RegisterRequest};
//! use arena::profile::ProfileManager;
//! use arena::storage::MemoryObjectStore;
//! use arena::store::MemoryStore;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let profiles = ProfileManager::new(store.clone(), Arc::new(MemoryObjectStore::new("/files")));
//! let auth = AuthManager::new(
//!     store,
//!     profiles,
//!     "secret_pepper".to_string(),
//!     "jwt_secret".to_string(),
//! );
//!
//! let user = auth
//!     .register(RegisterRequest {
//!         email: "player@example.com".to_string(),
//!         password: "SecurePass123".to_string(),
//!         display_name: Some("Player One".to_string()),
//!     })
//!     .await?;
//!
//! let (_, tokens) = auth
//!     .login(
//!         LoginRequest {
//!             email: "player@example.com".to_string(),
//!             password: "SecurePass123".to_string(),
//!         },
//!         "device".to_string(),
//!     )
//!     .await?;
//! assert_eq!(auth.verify_access_token(&tokens.access_token)?.sub, user.id);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::{AuthManager, validate_password};
pub use models::{
    AccessTokenClaims, AuthAccount, AuthProvider, FederatedClaims, FederatedIdentity,
    FederatedSignIn, LoginRequest, RegisterRequest, Session, SessionTokens, User, UserId,
};
