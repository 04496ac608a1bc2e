use async_trait::async_trait;
use chrono::{DateTime, Utc};
use landwarn_core::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::{SeenStore, SEEN_IDS_KEY};

/// SQLite-backed [`SeenStore`]. Ids are scoped by a store key so unrelated
/// sets can share one database file.
pub struct SqliteSeenStore {
    pool: SqlitePool,
    store_key: String,
}

impl SqliteSeenStore {
    /// Opens (creating if needed) the database at `db_path` with the
    /// standard seen-id key.
    pub async fn open(db_path: &str) -> Result<Self, StoreError> {
        Self::open_with_key(db_path, SEEN_IDS_KEY).await
    }

    pub async fn open_with_key(db_path: &str, store_key: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        let store = Self {
            pool,
            store_key: store_key.to_string(),
        };
        store.run_migrations().await?;

        info!("Opened seen-id store at {}", db_path);
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS seen_ids (
                store_key TEXT NOT NULL,
                notification_id TEXT NOT NULL,
                seen_at INTEGER NOT NULL,
                PRIMARY KEY (store_key, notification_id)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|_| StoreError::MigrationFailed {
            migration: "seen_ids".to_string(),
        })?;
        Ok(())
    }

    /// Deletes entries first seen before `cutoff` and returns how many were
    /// removed. A pruned id will alert again if the server ever redelivers
    /// it, so this is an operator decision; the polling loop never prunes.
    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM seen_ids WHERE store_key = ? AND seen_at < ?")
            .bind(&self.store_key)
            .bind(cutoff.timestamp())
            .execute(&self.pool)
            .await?;

        debug!(
            "Pruned {} seen ids older than {}",
            result.rows_affected(),
            cutoff
        );
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SeenStore for SqliteSeenStore {
    async fn contains(&self, notification_id: &str) -> Result<bool, StoreError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM seen_ids WHERE store_key = ? AND notification_id = ?")
                .bind(&self.store_key)
                .bind(notification_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, notification_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO seen_ids (store_key, notification_id, seen_at)
             VALUES (?, ?, ?)",
        )
        .bind(&self.store_key)
        .bind(notification_id)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seen_ids WHERE store_key = ?")
            .bind(&self.store_key)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM seen_ids WHERE store_key = ?")
            .bind(&self.store_key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
