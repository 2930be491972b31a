//! # Interview Form State
//!
//! The interview part of a submission form: TEXT notes or an AUDIO
//! recording, plus the consent flags that gate recording and submission.

use std::sync::Arc;

use thiserror::Error;

use crate::egui_app::capture::artifact::ImportedAudio;
use crate::egui_app::capture::clock::Clock;
use crate::egui_app::capture::device::{CaptureDevice, CaptureError};
use crate::egui_app::capture::session::CaptureSession;
use crate::shared::fields;

/// Which capture path the form targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    #[default]
    Text,
    Audio,
}

impl SourceMode {
    /// Value of the `interview_mode` field
    pub fn as_wire(&self) -> &'static str {
        match self {
            SourceMode::Text => "TEXT",
            SourceMode::Audio => "AUDIO",
        }
    }
}

/// Submission blocked by the interview state. Each variant targets a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GatingError {
    #[error("Participant consent is required for an audio interview.")]
    ConsentMissing,
    #[error("Audio recording must be allowed to submit an audio interview.")]
    AudioNotAllowed,
    #[error("Stop the recording before submitting.")]
    RecordingActive,
    #[error("Record or import the interview audio before submitting.")]
    ArtifactMissing,
    #[error("Interview notes cannot be empty.")]
    NotesEmpty,
}

impl GatingError {
    /// Form field the message is shown against
    pub fn field(&self) -> &'static str {
        match self {
            GatingError::ConsentMissing => fields::CONSENT_OBTAINED,
            GatingError::AudioNotAllowed => fields::AUDIO_RECORDING_ALLOWED,
            GatingError::RecordingActive | GatingError::ArtifactMissing => fields::AUDIO_DATA_URL,
            GatingError::NotesEmpty => fields::INTERVIEW_TEXT,
        }
    }
}

/// Interview section of the form
#[derive(Debug)]
pub struct InterviewForm {
    mode: SourceMode,
    consent: bool,
    audio_allowed: bool,
    pub notes: String,
    session: CaptureSession,
    /// Blocking message from the form rules, e.g. consent revoked mid-recording
    capture_error: Option<CaptureError>,
}

impl InterviewForm {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            mode: SourceMode::Text,
            consent: false,
            audio_allowed: false,
            notes: String::new(),
            session: CaptureSession::new(clock),
            capture_error: None,
        }
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    pub fn audio_allowed(&self) -> bool {
        self.audio_allowed
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CaptureSession {
        &mut self.session
    }

    /// Message for the capture panel: form rule first, then device failure
    pub fn capture_error(&self) -> Option<&CaptureError> {
        self.capture_error.as_ref().or(self.session.error())
    }

    /// Switch capture path. Leaving AUDIO discards the session and disallows
    /// recording.
    pub fn set_mode(&mut self, mode: SourceMode) {
        if mode == self.mode {
            return;
        }
        if mode == SourceMode::Text {
            self.session.stop();
            self.session.clear();
            self.audio_allowed = false;
            self.capture_error = None;
        }
        tracing::debug!(mode = mode.as_wire(), "Interview mode changed");
        self.mode = mode;
    }

    /// Revoking consent stops an active recording with a blocking error
    pub fn set_consent(&mut self, consent: bool) {
        self.consent = consent;
        if consent {
            if self.capture_error == Some(CaptureError::ConsentRequired) {
                self.capture_error = None;
            }
            return;
        }
        if self.session.state().is_active() {
            tracing::info!("Consent revoked during recording, stopping");
            self.session.stop();
            self.capture_error = Some(CaptureError::ConsentRequired);
        }
    }

    pub fn set_audio_allowed(&mut self, allowed: bool) {
        self.audio_allowed = allowed;
    }

    /// Begin recording. Requires consent; implies audio is allowed.
    pub async fn start_recording<D: CaptureDevice>(&mut self, device: &D) -> Result<bool, CaptureError> {
        if !self.session.state().accepts_start() {
            return Ok(false);
        }
        if !self.consent {
            self.capture_error = Some(CaptureError::ConsentRequired);
            return Err(CaptureError::ConsentRequired);
        }
        self.capture_error = None;
        self.audio_allowed = true;
        self.session.start(device).await
    }

    /// Use a selected file as the interview audio
    pub fn import_audio(&mut self, file: ImportedAudio) {
        self.session.import(file);
        self.mode = SourceMode::Audio;
        self.audio_allowed = true;
        self.capture_error = None;
    }

    /// Discard the recording and return the session to idle
    pub fn clear_recording(&mut self) {
        self.session.clear();
        self.capture_error = None;
    }

    /// Check whether the form may be submitted
    pub fn check_submission(&self) -> Result<(), GatingError> {
        match self.mode {
            SourceMode::Audio => {
                if !self.consent {
                    return Err(GatingError::ConsentMissing);
                }
                if !self.audio_allowed {
                    return Err(GatingError::AudioNotAllowed);
                }
                if self.session.state().is_active() {
                    return Err(GatingError::RecordingActive);
                }
                if self.session.artifact().is_none() {
                    return Err(GatingError::ArtifactMissing);
                }
                Ok(())
            }
            SourceMode::Text => {
                if self.notes.trim().is_empty() {
                    return Err(GatingError::NotesEmpty);
                }
                Ok(())
            }
        }
    }

    /// Start a fresh interview after a successful submission
    pub fn reset(&mut self) {
        self.session.clear();
        self.notes.clear();
        self.consent = false;
        self.audio_allowed = false;
        self.capture_error = None;
        self.mode = SourceMode::Text;
    }
}
