//! Document store abstraction backing every arena collection.
//!
//! All persistent state lives in named collections of JSON documents. Each
//! document carries a store-managed `version` that is bumped on every write,
//! which lets managers perform read-modify-write sequences as optimistic
//! compare-and-swap updates instead of racing each other.
//!
//! Two implementations are provided:
//! - [`MemoryStore`]: in-process maps, used for development and tests
//! - [`PgDocumentStore`]: PostgreSQL with JSONB bodies
//!
//! ## Example
//!
//! ```
//! use arena::store::{collections, DocumentStore, Filter, MemoryStore};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! store
//!     .insert(collections::WALLETS, "user-1", json!({"user_id": "user-1", "balance": 0}))
//!     .await?;
//!
//! let wallets = store
//!     .list(collections::WALLETS, &Filter::new().eq("user_id", "user-1"))
//!     .await?;
//! assert_eq!(wallets.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod memory;
pub mod postgres;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

/// Collection names
pub mod collections {
    pub const TOURNAMENTS: &str = "tournaments";
    pub const TOURNAMENT_DRAFTS: &str = "tournament_drafts";
    pub const USERS: &str = "users";
    pub const WALLETS: &str = "wallets";
    pub const TRANSACTIONS: &str = "transactions";
    pub const AUTH_ACCOUNTS: &str = "auth_accounts";
    pub const AUTH_SESSIONS: &str = "auth_sessions";
}

/// Maximum attempts of a read-modify-write sequence before giving up
pub const MAX_WRITE_ATTEMPTS: usize = 5;

/// Capacity of the change feed; slower subscribers skip ahead
pub const CHANGE_FEED_CAPACITY: usize = 1024;

/// A stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub version: i64,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Deserialize the document body
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Serialize a value into a document body
pub fn encode<T: Serialize>(value: &T) -> StoreResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Kind of change pushed on the change feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A single change pushed to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChange {
    pub collection: String,
    pub id: String,
    pub kind: ChangeKind,
    /// New document state, `None` for deletions
    pub document: Option<Document>,
}

/// A single list condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Top-level field equals the value
    Eq { field: String, value: Value },
    /// Top-level array field contains the value
    Contains { field: String, value: Value },
}

/// Conjunction of conditions applied by [`DocumentStore::list`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Filter matching every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    /// Require the array `field` to contain `value`
    pub fn contains(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Contains {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Evaluate the filter against a document body
    pub fn matches(&self, data: &Value) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq { field, value } => data.get(field) == Some(value),
            Condition::Contains { field, value } => data
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
        })
    }

    /// Express the filter as a JSONB containment pattern (`data @> pattern`)
    pub fn to_containment(&self) -> Value {
        let mut pattern = Map::new();
        for condition in &self.conditions {
            match condition {
                Condition::Eq { field, value } => {
                    pattern.insert(field.clone(), value.clone());
                }
                Condition::Contains { field, value } => {
                    let entry = pattern
                        .entry(field.clone())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    match entry {
                        Value::Array(items) => items.push(value.clone()),
                        other => *other = Value::Array(vec![value.clone()]),
                    }
                }
            }
        }
        Value::Object(pattern)
    }
}

/// Document database used by every manager
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Create a document, failing with [`StoreError::AlreadyExists`] if the id is taken
    async fn insert(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document>;

    /// Create or overwrite a document unconditionally
    async fn put(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document>;

    /// Overwrite a document only if its version still equals `expected_version`
    ///
    /// # Errors
    ///
    /// * `StoreError::VersionConflict` - The document changed since it was read
    /// * `StoreError::NotFound` - The document does not exist
    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        expected_version: i64,
    ) -> StoreResult<Document>;

    /// Delete a document, returning whether it existed
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;

    /// List the documents of a collection matching `filter`
    async fn list(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// Subscribe to the change feed
    fn subscribe(&self) -> broadcast::Receiver<DocumentChange>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> StoreResult<()>;
}

/// Read a document, apply `apply` to its decoded body and write it back.
///
/// The write is a versioned compare-and-swap; on a version conflict the
/// document is re-read and `apply` runs again, up to [`MAX_WRITE_ATTEMPTS`]
/// times. Any error returned by `apply` aborts without writing.
pub async fn modify<T, R, E, F>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    mut apply: F,
) -> Result<(T, R), E>
where
    T: Serialize + DeserializeOwned + Send,
    R: Send,
    E: From<StoreError> + Send,
    F: FnMut(&mut T) -> Result<R, E> + Send,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let document = store
            .get(collection, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        let mut value: T = document.decode()?;
        let outcome = apply(&mut value)?;

        match store
            .update(collection, id, encode(&value)?, document.version)
            .await
        {
            Ok(_) => return Ok((value, outcome)),
            Err(StoreError::VersionConflict { .. }) => {
                log::debug!("Version conflict on {collection}/{id}, attempt {attempt}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(StoreError::Contention {
        collection: collection.to_string(),
        id: id.to_string(),
        attempts: MAX_WRITE_ATTEMPTS,
    }
    .into())
}

/// Decode every document of a listing, skipping nothing
pub fn decode_all<T: DeserializeOwned>(documents: &[Document]) -> StoreResult<Vec<T>> {
    documents.iter().map(Document::decode).collect()
}
