/**
 * Server Configuration
 *
 * Ingest service settings from environment variables, with defaults for
 * local development:
 *
 * - `OPENFIELD_INGEST_DB` - SQLite URL
 * - `OPENFIELD_INGEST_ADDR` - listen address
 */

use std::net::SocketAddr;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::backend::ingest::db;
use crate::shared::ConfigError;

pub const DATABASE_ENV: &str = "OPENFIELD_INGEST_DB";
pub const ADDR_ENV: &str = "OPENFIELD_INGEST_ADDR";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://openfield-ingest.db?mode=rwc";
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub database_url: String,
    pub addr: SocketAddr,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_ENV).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let addr = lookup(ADDR_ENV)
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse()
            .map_err(|e| ConfigError::Parse(format!("{}: {}", ADDR_ENV, e)))?;
        Ok(Self { database_url, addr })
    }
}

/// Connect and create the ingest tables
pub async fn load_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Connecting to ingest database...");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    db::init_schema(&pool).await?;
    tracing::info!("Ingest database ready");
    Ok(pool)
}
