/**
 * Router Configuration
 *
 * Combines the route groups into one router and attaches the state.
 */

use axum::http::StatusCode;
use axum::Router;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

pub fn create_router(app_state: AppState) -> Router<()> {
    configure_api_routes(Router::new())
        .fallback(|| async { StatusCode::NOT_FOUND })
        .with_state(app_state)
}
