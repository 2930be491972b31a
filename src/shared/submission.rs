//! Submission Payload Types
//!
//! The serialized form payload exchanged between the collecting client and the
//! ingest endpoint. A form serializes into a flat mapping from field name to
//! either a single string or an ordered list of strings (checkbox groups,
//! multi-selects).
//!
//! # Wire Format
//!
//! ```json
//! { "submission": { "enumerator_name": "A", "symptoms": ["fever", "cough"] } }
//! ```
//!
//! The acknowledgement is any JSON object whose `ok` field is truthy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field names the client relies on. All of them are optional in a form.
pub mod fields {
    /// Facility selector (value is the facility id)
    pub const FACILITY_ID: &str = "facility_id";
    /// Free-text facility fallback
    pub const FACILITY_NAME: &str = "facility_name";
    pub const ENUMERATOR_NAME: &str = "enumerator_name";
    /// Client-generated submission identifier, doubles as idempotency key
    pub const CLIENT_UUID: &str = "client_uuid";
    pub const CLIENT_CREATED_AT: &str = "client_created_at";
    /// Provenance marker
    pub const SYNC_SOURCE: &str = "sync_source";
    pub const INTERVIEW_MODE: &str = "interview_mode";
    pub const INTERVIEW_TEXT: &str = "interview_text";
    pub const CONSENT_OBTAINED: &str = "consent_obtained";
    pub const AUDIO_RECORDING_ALLOWED: &str = "audio_recording_allowed";
    pub const AUDIO_DATA_URL: &str = "audio_data_url";
    pub const AUDIO_FILE_NAME: &str = "audio_file_name";
}

/// `sync_source` value for payloads delivered through the offline queue
pub const OFFLINE_SYNC_SOURCE: &str = "offline_queue";

/// A single form field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single-valued field
    Scalar(String),
    /// Repeated field, in document order
    List(Vec<String>),
}

impl FieldValue {
    /// The scalar value, or the first list element
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(value) => Some(value.as_str()),
            FieldValue::List(values) => values.first().map(String::as_str),
        }
    }

    /// Append another value for the same field name, promoting a scalar to a list
    pub fn push(&mut self, value: String) {
        match self {
            FieldValue::Scalar(existing) => {
                let first = std::mem::take(existing);
                *self = FieldValue::List(vec![first, value]);
            }
            FieldValue::List(values) => values.push(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::List(values)
    }
}

/// Serialized form payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionFields(BTreeMap<String, FieldValue>);

impl SubmissionFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Scalar (or first) value of a field, trimmed, `None` when blank
    pub fn text(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(FieldValue::first)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Insert or replace a field
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Add a value, turning repeated names into a list
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.get_mut(&name) {
            Some(existing) => existing.push(value),
            None => {
                self.0.insert(name, FieldValue::Scalar(value));
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for SubmissionFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Request body for the ingest endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub submission: SubmissionFields,
}

/// Acknowledgement returned by the ingest endpoint.
///
/// Decoding never fails on field types: anything but the `ok` flag is read
/// when it has the expected shape and ignored otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct IngestAck {
    /// Acknowledgement flag, evaluated for truthiness
    pub ok: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the server had already stored this `client_uuid`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<i64>,
}

impl From<serde_json::Value> for IngestAck {
    fn from(body: serde_json::Value) -> Self {
        let text = |name: &str| body.get(name).and_then(serde_json::Value::as_str).map(str::to_string);
        Self {
            ok: body.get("ok").cloned().unwrap_or_default(),
            message: text("message"),
            error: text("error"),
            duplicate: body
                .get("duplicate")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
            submission_id: body.get("submission_id").and_then(serde_json::Value::as_i64),
        }
    }
}

impl IngestAck {
    /// Positive acknowledgement
    pub fn accepted(submission_id: i64, duplicate: bool) -> Self {
        Self {
            ok: serde_json::Value::Bool(true),
            duplicate,
            submission_id: Some(submission_id),
            ..Self::default()
        }
    }

    /// Negative acknowledgement carrying a reason
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            ok: serde_json::Value::Bool(false),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Whether `ok` is truthy. Arrays and objects count as truthy even when
    /// empty.
    pub fn is_ok(&self) -> bool {
        match &self.ok {
            serde_json::Value::Null => false,
            serde_json::Value::Bool(flag) => *flag,
            serde_json::Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
            serde_json::Value::String(s) => !s.is_empty(),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
        }
    }

    /// Server-provided reason for a negative acknowledgement
    pub fn reason(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .filter(|reason| !reason.trim().is_empty())
    }
}
