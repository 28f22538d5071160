//! SQLite backend: a single `kv` table.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing::{debug, info};
use vitalis_core::{error::VitalisError, shellexpand, traits::KeyValueStore};

const KV_SCHEMA: &str = include_str!("../sql/kv.sql");

/// Key-value store backed by SQLite.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file at `path`.
    pub async fn open(path: &str) -> Result<Self, VitalisError> {
        let file = PathBuf::from(shellexpand(path));
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                VitalisError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let opts = SqliteConnectOptions::new()
            .filename(&file)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| {
                VitalisError::Storage(format!("failed to open {}: {e}", file.display()))
            })?;

        let store = Self::from_pool(pool).await?;
        info!("SQLite storage opened at {}", file.display());
        Ok(store)
    }

    /// Use an existing pool, creating the `kv` table if it is missing.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, VitalisError> {
        sqlx::raw_sql(KV_SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| VitalisError::Storage(format!("failed to create kv table: {e}")))?;
        Ok(Self { pool })
    }
}

const UPSERT: &str = "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, datetime('now')) \
                      ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

#[async_trait]
impl KeyValueStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, VitalisError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| VitalisError::Storage(format!("get {key} failed: {e}")))?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), VitalisError> {
        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| VitalisError::Storage(format!("set {key} failed: {e}")))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), VitalisError> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| VitalisError::Storage(format!("remove {key} failed: {e}")))?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), VitalisError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| VitalisError::Storage(format!("begin transaction failed: {e}")))?;

        for (key, value) in entries {
            sqlx::query(UPSERT)
                .bind(*key)
                .bind(value)
                .execute(&mut *tx)
                .await
                .map_err(|e| VitalisError::Storage(format!("set {key} failed: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| VitalisError::Storage(format!("commit failed: {e}")))?;
        debug!("sqlite storage: wrote {} key(s)", entries.len());
        Ok(())
    }
}
