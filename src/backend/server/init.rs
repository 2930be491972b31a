/**
 * Server Initialization
 *
 * Builds the ingest router around a database pool.
 */

use axum::Router;
use sqlx::SqlitePool;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, IngestConfig};
use crate::backend::server::state::AppState;

/// Router for an already initialized pool
pub fn create_app(db_pool: SqlitePool) -> Router<()> {
    tracing::info!("Initializing ingest service");
    create_router(AppState { db_pool })
}

/// Connect to the configured database and build the router
pub async fn create_app_from_config(config: &IngestConfig) -> Result<Router<()>, sqlx::Error> {
    let pool = load_database(&config.database_url).await?;
    Ok(create_app(pool))
}
