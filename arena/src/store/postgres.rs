//! PostgreSQL-backed document store.
//!
//! Every collection shares one `documents` table keyed by `(collection, id)`
//! with a JSONB body. List filters compile to a single `data @> pattern`
//! containment test, served by a GIN index.

use super::{
    CHANGE_FEED_CAPACITY, ChangeKind, Document, DocumentChange, DocumentStore, Filter,
    config::DatabaseConfig,
    errors::{StoreError, StoreResult},
    timeouts::{DEFAULT_QUERY_TIMEOUT, with_timeout},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{
    Row,
    postgres::{PgPool, PgPoolOptions, PgRow},
};
use std::time::Duration;
use tokio::sync::broadcast;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        version BIGINT NOT NULL DEFAULT 1,
        data JSONB NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (collection, id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS documents_data_idx ON documents USING GIN (data jsonb_path_ops)",
];

/// Document store on a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    changes: broadcast::Sender<DocumentChange>,
    query_timeout: Duration,
}

impl PgDocumentStore {
    /// Connect a new pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use arena::store::{DatabaseConfig, PgDocumentStore};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), arena::store::StoreError> {
    ///     let store = PgDocumentStore::connect(&DatabaseConfig::from_env()).await?;
    ///     store.migrate().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            pool,
            changes,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the per-query timeout
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the documents table and index if missing
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            with_timeout(
                self.query_timeout,
                sqlx::query(statement).execute(&self.pool),
            )
            .await?;
        }
        log::info!("Document store schema is up to date");
        Ok(())
    }

    /// Close the connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }

    fn publish(&self, collection: &str, id: &str, kind: ChangeKind, document: Option<Document>) {
        let _ = self.changes.send(DocumentChange {
            collection: collection.to_string(),
            id: id.to_string(),
            kind,
            document,
        });
    }
}

fn document_from_row(row: &PgRow) -> Document {
    Document {
        id: row.get("id"),
        version: row.get("version"),
        data: row.get::<Value, _>("data"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                "SELECT id, version, data, updated_at FROM documents WHERE collection = $1 AND id = $2",
            )
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(document_from_row))
    }

    async fn insert(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                r#"
                INSERT INTO documents (collection, id, version, data, updated_at)
                VALUES ($1, $2, 1, $3, NOW())
                ON CONFLICT (collection, id) DO NOTHING
                RETURNING id, version, data, updated_at
                "#,
            )
            .bind(collection)
            .bind(id)
            .bind(&data)
            .fetch_optional(&self.pool),
        )
        .await?;

        let document = row
            .as_ref()
            .map(document_from_row)
            .ok_or_else(|| StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        self.publish(collection, id, ChangeKind::Created, Some(document.clone()));
        Ok(document)
    }

    async fn put(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                r#"
                INSERT INTO documents (collection, id, version, data, updated_at)
                VALUES ($1, $2, 1, $3, NOW())
                ON CONFLICT (collection, id)
                DO UPDATE SET
                    version = documents.version + 1,
                    data = EXCLUDED.data,
                    updated_at = NOW()
                RETURNING id, version, data, updated_at
                "#,
            )
            .bind(collection)
            .bind(id)
            .bind(&data)
            .fetch_one(&self.pool),
        )
        .await?;

        let document = document_from_row(&row);
        let kind = if document.version == 1 {
            ChangeKind::Created
        } else {
            ChangeKind::Updated
        };
        self.publish(collection, id, kind, Some(document.clone()));
        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        expected_version: i64,
    ) -> StoreResult<Document> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                r#"
                UPDATE documents
                SET version = version + 1, data = $3, updated_at = NOW()
                WHERE collection = $1 AND id = $2 AND version = $4
                RETURNING id, version, data, updated_at
                "#,
            )
            .bind(collection)
            .bind(id)
            .bind(&data)
            .bind(expected_version)
            .fetch_optional(&self.pool),
        )
        .await?;

        match row {
            Some(row) => {
                let document = document_from_row(&row);
                self.publish(collection, id, ChangeKind::Updated, Some(document.clone()));
                Ok(document)
            }
            // Either the version moved on or the document is gone
            None => match self.get(collection, id).await? {
                Some(_) => Err(StoreError::VersionConflict {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    expected: expected_version,
                }),
                None => Err(StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                }),
            },
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let result = with_timeout(
            self.query_timeout,
            sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.publish(collection, id, ChangeKind::Deleted, None);
        }
        Ok(removed)
    }

    async fn list(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let rows = with_timeout(
            self.query_timeout,
            sqlx::query(
                r#"
                SELECT id, version, data, updated_at
                FROM documents
                WHERE collection = $1 AND data @> $2
                ORDER BY updated_at
                "#,
            )
            .bind(collection)
            .bind(filter.to_containment())
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(document_from_row).collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentChange> {
        self.changes.subscribe()
    }

    async fn health_check(&self) -> StoreResult<()> {
        with_timeout(
            self.query_timeout,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await?;
        Ok(())
    }
}
