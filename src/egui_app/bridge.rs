//! # Submission Composer
//!
//! Turns the visible form plus the interview state into a submission payload.
//! The same payload shape is posted directly when online and queued when not;
//! queued payloads carry the `sync_source=offline_queue` marker.
//!
//! A composer holds the client identifier and creation timestamp of one
//! logical submission. Composing again reuses them, so a retried submit is
//! recognisable server side; [`SubmissionComposer::renew`] starts the next
//! submission once the current one is delivered or queued.

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::egui_app::capture::{GatingError, InterviewForm, SourceMode};
use crate::shared::{fields, SubmissionFields, OFFLINE_SYNC_SOURCE};

/// Why a submission could not be composed
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Gating(#[from] GatingError),
    #[error("Could not read the interview audio: {0}")]
    AudioUnreadable(#[source] std::io::Error),
}

/// How a payload reaches the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Posted straight from the form
    Direct,
    /// Delivered later from the offline queue
    Offline,
}

/// Name/value pairs in form order. Repeated names (checkbox groups,
/// multi-selects) become ordered lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    values: Vec<(String, String)>,
    facility_label: Option<String>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.push((name.into(), value.into()));
    }

    /// Builder form of [`FormSnapshot::push`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Label of the selected facility option, used for display only
    pub fn with_facility_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.facility_label = (!label.trim().is_empty()).then_some(label);
        self
    }

    pub fn facility_label(&self) -> Option<&str> {
        self.facility_label.as_deref()
    }

    /// Flatten into submission fields
    pub fn to_fields(&self) -> SubmissionFields {
        let mut submission = SubmissionFields::new();
        for (name, value) in &self.values {
            submission.append(name.clone(), value.clone());
        }
        submission
    }
}

/// A payload ready for delivery or queueing
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedSubmission {
    pub fields: SubmissionFields,
    pub facility_label: Option<String>,
    pub provenance: Provenance,
}

impl ComposedSubmission {
    pub fn client_uuid(&self) -> Option<&str> {
        self.fields.text(fields::CLIENT_UUID)
    }

    /// Same payload, marked as delivered through the offline queue
    pub fn into_offline(mut self) -> Self {
        self.fields.set(fields::SYNC_SOURCE, OFFLINE_SYNC_SOURCE);
        self.provenance = Provenance::Offline;
        self
    }
}

/// Composes submissions for one form
#[derive(Debug, Clone)]
pub struct SubmissionComposer {
    client_uuid: Uuid,
    created_at: DateTime<Utc>,
}

impl Default for SubmissionComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionComposer {
    pub fn new() -> Self {
        Self {
            client_uuid: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    pub fn client_uuid(&self) -> Uuid {
        self.client_uuid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Build the payload.
    ///
    /// Fails without side effects when the interview blocks submission.
    pub fn compose(
        &self,
        form: &FormSnapshot,
        interview: Option<&InterviewForm>,
        provenance: Provenance,
    ) -> Result<ComposedSubmission, BridgeError> {
        if let Some(interview) = interview {
            interview.check_submission()?;
        }

        let mut submission = form.to_fields();
        submission.set(fields::CLIENT_UUID, self.client_uuid.to_string());
        submission.set(
            fields::CLIENT_CREATED_AT,
            self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        if let Some(interview) = interview {
            write_interview(&mut submission, interview)?;
        }

        let composed = ComposedSubmission {
            fields: submission,
            facility_label: form.facility_label.clone(),
            provenance: Provenance::Direct,
        };
        Ok(match provenance {
            Provenance::Direct => composed,
            Provenance::Offline => composed.into_offline(),
        })
    }

    /// Start a new logical submission
    pub fn renew(&mut self) {
        let previous = self.client_uuid;
        self.client_uuid = Uuid::new_v4();
        self.created_at = Utc::now();
        tracing::debug!(previous = %previous, next = %self.client_uuid, "Submission identity renewed");
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn write_interview(submission: &mut SubmissionFields, interview: &InterviewForm) -> Result<(), BridgeError> {
    submission.set(fields::INTERVIEW_MODE, interview.mode().as_wire());
    submission.set(fields::CONSENT_OBTAINED, flag(interview.consent()));
    submission.set(fields::AUDIO_RECORDING_ALLOWED, flag(interview.audio_allowed()));

    let notes = interview.notes.trim();
    if !notes.is_empty() {
        submission.set(fields::INTERVIEW_TEXT, notes);
    }

    if interview.mode() == SourceMode::Audio {
        if let Some(artifact) = interview.session().artifact() {
            let data_url = artifact.to_data_url().map_err(BridgeError::AudioUnreadable)?;
            submission.set(fields::AUDIO_DATA_URL, data_url);
            submission.set(fields::AUDIO_FILE_NAME, artifact.file_name());
        }
    }
    Ok(())
}
