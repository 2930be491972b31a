/**
 * Backend Error Types
 *
 * Errors raised while handling ingest requests. Every variant maps to an
 * HTTP status; the body is always a negative acknowledgement.
 *
 * # Error Categories
 *
 * - `Validation` - a submission field is missing or malformed (422)
 * - `BadRequest` - the body is not an ingest request (400)
 * - `Database` - the submission could not be stored (500)
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Submission field failed validation
    #[error("{message}")]
    Validation {
        field: String,
        message: String,
    },

    /// Request body could not be read as an ingest request
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Payload could not be serialized for storage
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Storage details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            Self::Database(_) => "Could not store the submission".to_string(),
            Self::Serialization(_) => "Could not encode the submission".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<SharedError> for BackendError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::ValidationError { field, message } => Self::Validation { field, message },
            SharedError::SerializationError { message } => Self::BadRequest(message),
        }
    }
}
