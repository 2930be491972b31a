//! # Local Database Module
//!
//! SQLite-backed key/value store for the offline queue. Each queue identity
//! occupies one row of `queue_storage`, holding the whole serialized queue.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use openfield_collect::egui_app::local_db::LocalDatabase;
//! use openfield_collect::egui_app::offline::OfflineQueue;
//!
//! # async fn example() -> Result<(), sqlx::Error> {
//! let db = LocalDatabase::open(LocalDatabase::default_path()).await?;
//! let queue = OfflineQueue::open(db, "default").await;
//! # let _ = queue;
//! # Ok(())
//! # }
//! ```

pub mod schema;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use crate::egui_app::offline::storage::{QueueStorage, StorageError};

/// Result type for local database operations
pub type Result<T> = sqlx::Result<T>;

/// Local database connection manager
#[derive(Debug, Clone)]
pub struct LocalDatabase {
    pool: SqlitePool,
}

impl LocalDatabase {
    /// Open or create the database file at `path` and initialize the schema.
    ///
    /// Uses WAL mode so a reader never blocks the queue writer.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::info!(path = %path.display(), "Local database opened");
        Ok(db)
    }

    /// Open a private in-memory database
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Platform data directory location of the database file
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("openfield");
        path.push("offline.db");
        path
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in schema::SCHEMA_STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        let current_version: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        if schema::needs_migration(current_version.0) {
            sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(schema::CURRENT_SCHEMA_VERSION)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store a value
    pub async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO queue_storage (key, value, updated_at)
             VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a stored value
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM queue_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }
}

impl QueueStorage for LocalDatabase {
    async fn read(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
        Ok(self.get_value(key).await?)
    }

    async fn write(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
        Ok(self.set_value(key, value).await?)
    }
}
