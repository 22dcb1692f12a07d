//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = String;

/// How an account signs in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthProvider {
    Password,
    Anonymous,
    /// Identity verified by an upstream provider (e.g. "google")
    Federated { provider: String, subject: String },
}

impl AuthProvider {
    /// Lookup key for federated identities
    pub fn federated_key(provider: &str, subject: &str) -> String {
        format!("{}:{}", provider.to_lowercase(), subject)
    }
}

/// Stored account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthAccount {
    pub user_id: UserId,
    pub email: Option<String>,
    /// Lower-cased email, used for lookups and uniqueness
    pub email_key: Option<String>,
    pub password_hash: Option<String>,
    pub provider: AuthProvider,
    pub provider_key: Option<String>,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
    pub display_name: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&AuthAccount> for User {
    fn from(account: &AuthAccount) -> Self {
        Self {
            id: account.user_id.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            is_anonymous: account.provider == AuthProvider::Anonymous,
            created_at: account.created_at,
            last_login: account.last_login,
        }
    }
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity asserted by a social sign-in provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedIdentity {
    pub provider: String,
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Federated sign-in request carrying the identity broker's signed token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedSignIn {
    #[serde(default)]
    pub id_token: String,
}

/// Claims of an identity token issued by the identity broker
///
/// Tokens are HS256 JWTs signed with the shared federation secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedClaims {
    pub provider: String,
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl From<FederatedClaims> for FederatedIdentity {
    fn from(claims: FederatedClaims) -> Self {
        Self {
            provider: claims.provider,
            subject: claims.sub,
            email: claims.email,
            display_name: claims.name,
        }
    }
}

/// Session tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// JWT claims for access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: UserId,
    pub email: Option<String>,
    pub anonymous: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Refresh session, keyed by its token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub device_fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
