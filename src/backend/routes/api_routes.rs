/**
 * API Routes
 *
 * - `POST /api/sync/submissions` - submission ingest
 * - `GET /api/health` - liveness for connectivity probes
 */

use axum::routing::{get, post};
use axum::Router;

use crate::backend::ingest::{health, ingest_submission};
use crate::backend::server::state::AppState;

pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/sync/submissions", post(ingest_submission))
        .route("/api/health", get(health))
}
