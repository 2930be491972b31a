//! HTTP handlers for submission ingest

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::json;
use sqlx::SqlitePool;

use crate::backend::error::BackendError;
use crate::backend::ingest::db::{self, NewSubmission};
use crate::shared::{fields, IngestAck, IngestRequest, SharedError};

/// `POST /api/sync/submissions`
///
/// Stores the submission once per `client_uuid`. A repeated delivery is
/// acknowledged with `duplicate: true`.
pub async fn ingest_submission(
    State(pool): State<SqlitePool>,
    body: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestAck>, BackendError> {
    let Json(request) = body.map_err(|rejection| BackendError::bad_request(rejection.body_text()))?;
    let submission = request.submission;

    let client_uuid = submission
        .text(fields::CLIENT_UUID)
        .ok_or_else(|| SharedError::validation(fields::CLIENT_UUID, "Missing client_uuid"))?;

    let record = NewSubmission {
        client_uuid,
        client_created_at: submission.text(fields::CLIENT_CREATED_AT),
        sync_source: submission.text(fields::SYNC_SOURCE),
        payload: serde_json::to_string(&submission)?,
    };

    let outcome = db::insert_submission(&pool, &record).await?;
    tracing::info!(
        client_uuid,
        submission_id = outcome.id,
        duplicate = outcome.duplicate,
        sync_source = record.sync_source.unwrap_or("direct"),
        "Submission ingested"
    );

    Ok(Json(IngestAck::accepted(outcome.id, outcome.duplicate)))
}

/// `GET /api/health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}
