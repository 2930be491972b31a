//! # Capture Devices
//!
//! The seam between a capture session and the platform's microphone. A
//! [`CaptureDevice`] opens [`CaptureStream`]s; a stream is polled for
//! [`CaptureEvent`]s from the UI loop and released when dropped.

use std::future::Future;

use thiserror::Error;

/// Device access failures. The display text is shown in the capture panel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Microphone access was denied. Allow access and try again.")]
    PermissionDenied,
    #[error("Audio recording is not supported on this device.")]
    Unsupported,
    #[error("The microphone is in use by another application.")]
    DeviceBusy,
    #[error("Could not start recording: {0}")]
    Device(String),
    #[error("Recording requires participant consent.")]
    ConsentRequired,
}

/// Output of an open stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Encoded media bytes, in capture order
    Fragment(Vec<u8>),
    /// The stream has flushed everything after a stop
    Finished,
    /// The device failed mid-capture
    Failed(String),
}

/// An open capture stream.
///
/// `stop` only requests finalization; remaining fragments and then
/// [`CaptureEvent::Finished`] arrive through `poll_event`. Dropping the stream
/// releases the device.
pub trait CaptureStream: Send {
    /// Container/codec the stream produces
    fn mime_type(&self) -> &str;

    fn pause(&mut self);

    fn resume(&mut self);

    fn stop(&mut self);

    /// Next pending event, without blocking
    fn poll_event(&mut self) -> Option<CaptureEvent>;
}

/// Platform audio-capture capability
pub trait CaptureDevice: Send + Sync {
    /// Whether the device can produce `mime`
    fn supports_type(&self, mime: &str) -> bool;

    /// Open a stream producing `mime`, or the device default when `None`
    fn open(
        &self,
        mime: Option<&str>,
    ) -> impl Future<Output = Result<Box<dyn CaptureStream>, CaptureError>> + Send;
}

/// Device for platforms without audio input
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCaptureDevice;

impl CaptureDevice for NoCaptureDevice {
    fn supports_type(&self, _mime: &str) -> bool {
        false
    }

    async fn open(&self, _mime: Option<&str>) -> Result<Box<dyn CaptureStream>, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}
