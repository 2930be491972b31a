/**
 * Application State
 *
 * Shared by all ingest handlers. `FromRef` lets handlers extract the pool
 * directly.
 */

use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db_pool.clone()
    }
}
