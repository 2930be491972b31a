//! # Capture Session
//!
//! State machine for one recording:
//!
//! ```text
//! idle ──start──▶ recording ⇄ paused ──stop──▶ stopping ──▶ stopped-with-audio
//!   │                                                   └─▶ stopped-empty
//!   └── device failure ──▶ error (behaves like idle)
//! ```
//!
//! `import` jumps straight to `stopped-with-audio` from any state; `clear`
//! returns to `idle` from any state. Elapsed time counts recorded segments
//! only.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::egui_app::capture::artifact::{AudioArtifact, ImportedAudio, RecordedAudio};
use crate::egui_app::capture::clock::Clock;
use crate::egui_app::capture::device::{CaptureDevice, CaptureError, CaptureEvent, CaptureStream};
use crate::egui_app::capture::encoding::{select_encoding, FALLBACK_MIME_TYPE};

/// Refresh period of the elapsed-time display while recording
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Status shown when a recording produced no fragments
pub const NO_AUDIO_MESSAGE: &str = "No audio captured.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
    Paused,
    /// Stop requested, waiting for the stream to flush
    Stopping,
    StoppedWithAudio,
    StoppedEmpty,
    Error,
}

impl CaptureState {
    pub fn label(&self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::Recording => "recording",
            CaptureState::Paused => "paused",
            CaptureState::Stopping => "stopping",
            CaptureState::StoppedWithAudio => "stopped-with-audio",
            CaptureState::StoppedEmpty => "stopped-empty",
            CaptureState::Error => "error",
        }
    }

    /// Recording or paused
    pub fn is_active(&self) -> bool {
        matches!(self, CaptureState::Recording | CaptureState::Paused)
    }

    /// States from which `start` opens a stream
    pub fn accepts_start(&self) -> bool {
        matches!(self, CaptureState::Idle | CaptureState::Error)
    }
}

/// One capture session, owned by the interview form
pub struct CaptureSession {
    clock: Arc<dyn Clock>,
    state: CaptureState,
    elapsed_before_pause_ms: u64,
    /// Anchor of the active segment, set only while recording
    start_epoch_ms: Option<u64>,
    chunks: Vec<Vec<u8>>,
    encoding: Option<String>,
    artifact: Option<AudioArtifact>,
    stream: Option<Box<dyn CaptureStream>>,
    status: Option<String>,
    error: Option<CaptureError>,
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("elapsed_before_pause_ms", &self.elapsed_before_pause_ms)
            .field("chunks", &self.chunks.len())
            .field("encoding", &self.encoding)
            .field("has_artifact", &self.artifact.is_some())
            .field("has_stream", &self.stream.is_some())
            .field("error", &self.error)
            .finish()
    }
}

impl CaptureSession {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: CaptureState::Idle,
            elapsed_before_pause_ms: 0,
            start_epoch_ms: None,
            chunks: Vec::new(),
            encoding: None,
            artifact: None,
            stream: None,
            status: None,
            error: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn artifact(&self) -> Option<&AudioArtifact> {
        self.artifact.as_ref()
    }

    /// Informational status line, e.g. "No audio captured."
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Device error that put the session in `error`
    pub fn error(&self) -> Option<&CaptureError> {
        self.error.as_ref()
    }

    /// Encoding of the current or last recording
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Recorded duration, excluding pauses
    pub fn elapsed_ms(&self) -> u64 {
        let active = match (self.state, self.start_epoch_ms) {
            (CaptureState::Recording, Some(epoch)) => self.clock.now_ms().saturating_sub(epoch),
            _ => 0,
        };
        self.elapsed_before_pause_ms + active
    }

    /// Whether the elapsed display needs refreshing every [`TICK_INTERVAL`]
    pub fn needs_tick(&self) -> bool {
        self.state == CaptureState::Recording
    }

    /// Whether stream events are still expected
    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Open a stream and begin recording.
    ///
    /// Returns `Ok(false)` without touching the device unless the session is
    /// idle. On device failure the session moves to `error`.
    pub async fn start<D: CaptureDevice>(&mut self, device: &D) -> Result<bool, CaptureError> {
        if !self.state.accepts_start() {
            tracing::debug!(state = self.state.label(), "Start ignored, session not idle");
            return Ok(false);
        }

        let preferred = select_encoding(device);
        match device.open(preferred).await {
            Ok(stream) => {
                let encoding = match stream.mime_type() {
                    "" => preferred.unwrap_or(FALLBACK_MIME_TYPE).to_string(),
                    reported => reported.to_string(),
                };
                tracing::info!(encoding = %encoding, "Recording started");

                self.chunks.clear();
                self.artifact = None;
                self.status = None;
                self.error = None;
                self.elapsed_before_pause_ms = 0;
                self.encoding = Some(encoding);
                self.stream = Some(stream);
                self.start_epoch_ms = Some(self.clock.now_ms());
                self.state = CaptureState::Recording;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Could not open capture device: {}", e);
                self.state = CaptureState::Error;
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state != CaptureState::Recording {
            return false;
        }
        self.settle_elapsed();
        if let Some(stream) = self.stream.as_mut() {
            stream.pause();
        }
        self.state = CaptureState::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != CaptureState::Paused {
            return false;
        }
        self.start_epoch_ms = Some(self.clock.now_ms());
        if let Some(stream) = self.stream.as_mut() {
            stream.resume();
        }
        self.state = CaptureState::Recording;
        true
    }

    /// Request the stream to stop. The session settles once the stream
    /// reports it has finished, possibly within this call.
    pub fn stop(&mut self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.settle_elapsed();
        self.state = CaptureState::Stopping;
        if let Some(stream) = self.stream.as_mut() {
            stream.stop();
        }
        self.pump();
        true
    }

    /// Process pending stream events. Called from the UI loop.
    pub fn pump(&mut self) {
        while let Some(event) = self.stream.as_mut().and_then(|stream| stream.poll_event()) {
            match event {
                CaptureEvent::Fragment(bytes) => {
                    if !bytes.is_empty() {
                        self.chunks.push(bytes);
                    }
                }
                CaptureEvent::Finished => {
                    self.settle_elapsed();
                    self.finalize();
                    break;
                }
                CaptureEvent::Failed(message) => {
                    tracing::warn!("Capture stream failed: {}", message);
                    self.stream = None;
                    self.chunks.clear();
                    self.start_epoch_ms = None;
                    self.state = CaptureState::Error;
                    self.error = Some(CaptureError::Device(message));
                    break;
                }
            }
        }
    }

    /// Discard everything and return to `idle`
    pub fn clear(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Capture stream released");
        }
        self.chunks.clear();
        self.artifact = None;
        self.encoding = None;
        self.status = None;
        self.error = None;
        self.elapsed_before_pause_ms = 0;
        self.start_epoch_ms = None;
        self.state = CaptureState::Idle;
    }

    /// Use a selected file as the artifact, stopping any active recording
    pub fn import(&mut self, file: ImportedAudio) {
        if self.stream.take().is_some() {
            tracing::info!("Active recording stopped for import");
        }
        self.chunks.clear();
        self.elapsed_before_pause_ms = 0;
        self.start_epoch_ms = None;
        self.error = None;
        self.encoding = Some(file.mime.clone());
        self.status = Some(format!("Imported {}", file.file_name));
        self.artifact = Some(AudioArtifact::Imported(file));
        self.state = CaptureState::StoppedWithAudio;
    }

    fn settle_elapsed(&mut self) {
        if let Some(epoch) = self.start_epoch_ms.take() {
            self.elapsed_before_pause_ms += self.clock.now_ms().saturating_sub(epoch);
        }
    }

    fn finalize(&mut self) {
        self.stream = None;
        if self.chunks.is_empty() {
            self.state = CaptureState::StoppedEmpty;
            self.status = Some(NO_AUDIO_MESSAGE.to_string());
            self.artifact = None;
            return;
        }

        let mime = self.encoding.as_deref().unwrap_or(FALLBACK_MIME_TYPE);
        let audio = RecordedAudio::from_fragments(std::mem::take(&mut self.chunks), mime);
        tracing::info!(bytes = audio.bytes.len(), elapsed_ms = self.elapsed_before_pause_ms, "Recording finalized");
        self.status = Some(format!("Recorded {}", format_elapsed(self.elapsed_before_pause_ms)));
        self.artifact = Some(AudioArtifact::Recorded(audio));
        self.state = CaptureState::StoppedWithAudio;
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Capture stream released on teardown");
        }
    }
}

/// `mm:ss` display of a duration
pub fn format_elapsed(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
