//! Database operations for received submissions
//!
//! Submissions are stored once per `client_uuid`; a repeated delivery returns
//! the existing row.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// Schema for the ingest store
pub const SCHEMA_STATEMENTS: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS offline_submissions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_uuid TEXT NOT NULL UNIQUE,
        client_created_at TEXT,
        sync_source TEXT,
        payload TEXT NOT NULL,
        synced_at TEXT NOT NULL
    )
    "#];

/// A submission to store
#[derive(Debug, Clone)]
pub struct NewSubmission<'a> {
    pub client_uuid: &'a str,
    pub client_created_at: Option<&'a str>,
    pub sync_source: Option<&'a str>,
    /// Full submission as JSON
    pub payload: String,
}

/// Result of a store attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOutcome {
    pub id: i64,
    /// The `client_uuid` was already stored
    pub duplicate: bool,
}

/// A stored submission row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSubmission {
    pub id: i64,
    pub client_uuid: String,
    pub client_created_at: Option<String>,
    pub sync_source: Option<String>,
    pub payload: String,
    pub synced_at: String,
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Store a submission unless its `client_uuid` is already present
pub async fn insert_submission(pool: &SqlitePool, submission: &NewSubmission<'_>) -> Result<StoreOutcome, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO offline_submissions (client_uuid, client_created_at, sync_source, payload, synced_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(client_uuid) DO NOTHING
        "#,
    )
    .bind(submission.client_uuid)
    .bind(submission.client_created_at)
    .bind(submission.sync_source)
    .bind(&submission.payload)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(StoreOutcome {
            id: result.last_insert_rowid(),
            duplicate: false,
        });
    }

    let row = sqlx::query("SELECT id FROM offline_submissions WHERE client_uuid = ?1")
        .bind(submission.client_uuid)
        .fetch_one(pool)
        .await?;

    Ok(StoreOutcome {
        id: row.get("id"),
        duplicate: true,
    })
}

pub async fn find_by_client_uuid(pool: &SqlitePool, client_uuid: &str) -> Result<Option<StoredSubmission>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, client_uuid, client_created_at, sync_source, payload, synced_at
        FROM offline_submissions
        WHERE client_uuid = ?1
        "#,
    )
    .bind(client_uuid)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| StoredSubmission {
        id: row.get("id"),
        client_uuid: row.get("client_uuid"),
        client_created_at: row.get("client_created_at"),
        sync_source: row.get("sync_source"),
        payload: row.get("payload"),
        synced_at: row.get("synced_at"),
    }))
}

pub async fn count_submissions(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM offline_submissions")
        .fetch_one(pool)
        .await?;
    Ok(row.get("count"))
}
