/**
 * Error Conversion
 *
 * Backend errors render as a negative ingest acknowledgement:
 * ```json
 * { "ok": false, "error": "Error message" }
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;
use crate::shared::IngestAck;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Ingest request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Ingest request rejected: {}", self);
        }
        (status, Json(IngestAck::rejected(self.message()))).into_response()
    }
}
