//! Append-only record of completed assist requests

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::error::Result;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    action TEXT,
    original_text TEXT,
    result_text TEXT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub action: String,
    pub original_text: String,
    pub result_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub action: Option<String>,
    pub original_text: Option<String>,
    pub result_text: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
}

type HistoryRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<NaiveDateTime>,
);

impl From<HistoryRow> for HistoryRecord {
    fn from((id, action, original_text, result_text, timestamp): HistoryRow) -> Self {
        Self {
            id,
            action,
            original_text,
            result_text,
            timestamp,
        }
    }
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist one entry and return its id
    async fn append(&self, entry: NewHistoryEntry) -> Result<i64>;

    /// Most recent entries first
    async fn list_recent(&self, limit: i64) -> Result<Vec<HistoryRecord>>;
}

#[derive(Clone)]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Open (creating if missing) the database file and ensure the table exists
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database, mostly useful for tests
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, entry: NewHistoryEntry) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO history (action, original_text, result_text) VALUES (?, ?, ?)",
        )
        .bind(&entry.action)
        .bind(&entry.original_text)
        .bind(&entry.result_text)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, action = %entry.action, "history entry saved");
        Ok(id)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT id, action, original_text, result_text, timestamp \
             FROM history ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(HistoryRecord::from).collect())
    }
}
