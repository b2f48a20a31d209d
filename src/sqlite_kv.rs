//! SQLite-backed [`KeyValueStore`] implementation.
//!
//! Persists the reader's last position and preferences in the `kv` table
//! so they survive process restarts.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use lectern_core::kv::KeyValueStore;

use crate::config::Config;
use crate::{db, migrate};

/// SQLite implementation of the [`KeyValueStore`] trait.
pub struct SqliteKv {
    pool: SqlitePool,
}

impl SqliteKv {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured state database, creating the schema if needed.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::migrate_pool(&pool).await?;
        Ok(Self::new(pool))
    }

    /// All entries, ordered by key.
    pub async fn entries(&self) -> Result<Vec<(String, String)>> {
        let rows = sqlx::query("SELECT key, value FROM kv ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| (row.get::<String, _>("key"), row.get::<String, _>("value")))
            .collect())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl KeyValueStore for SqliteKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
