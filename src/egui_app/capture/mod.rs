//! # Audio Interview Capture
//!
//! Recording, pausing, stopping and importing interview audio, with the
//! consent rules that gate both recording and submission.
//!
//! ## Key Components
//!
//! - `session.rs`: the capture state machine
//! - `interview.rs`: TEXT/AUDIO mode, consent flags and submission gating
//! - `device.rs`: the platform capture seam
//! - `encoding.rs`: preferred container/codec selection
//! - `artifact.rs`: recorded or imported audio and its inline encoding
//! - `native.rs`: cpal microphone backend (`native-audio` feature)

pub mod artifact;
pub mod clock;
pub mod device;
pub mod encoding;
pub mod interview;
#[cfg(feature = "native-audio")]
pub mod native;
pub mod session;

pub use artifact::{AudioArtifact, ImportedAudio, RecordedAudio};
pub use clock::{Clock, ManualClock, SystemClock};
pub use device::{CaptureDevice, CaptureError, CaptureEvent, CaptureStream, NoCaptureDevice};
pub use encoding::{select_encoding, PREFERRED_ENCODINGS};
pub use interview::{GatingError, InterviewForm, SourceMode};
pub use session::{CaptureSession, CaptureState, TICK_INTERVAL};

/// Capture device used by the desktop app
#[cfg(feature = "native-audio")]
pub type PlatformCaptureDevice = native::NativeCaptureDevice;

/// Capture device used by the desktop app
#[cfg(not(feature = "native-audio"))]
pub type PlatformCaptureDevice = NoCaptureDevice;
