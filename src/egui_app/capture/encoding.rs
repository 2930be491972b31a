//! Recording encoding selection

use crate::egui_app::capture::device::CaptureDevice;

/// Container/codec combinations, most preferred first
pub const PREFERRED_ENCODINGS: &[&str] = &[
    "audio/webm;codecs=opus",
    "audio/webm",
    "audio/ogg;codecs=opus",
    "audio/mp4",
    "audio/wav",
];

/// Type assumed when a stream does not report one
pub const FALLBACK_MIME_TYPE: &str = "audio/webm";

/// First preferred encoding the device supports. `None` means the device
/// default should be used.
pub fn select_encoding<D: CaptureDevice>(device: &D) -> Option<&'static str> {
    PREFERRED_ENCODINGS
        .iter()
        .copied()
        .find(|mime| device.supports_type(mime))
}

/// File extension for a MIME type, ignoring codec parameters
pub fn extension_for(mime: &str) -> &'static str {
    match base_type(mime) {
        "audio/webm" => "webm",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        "audio/mpeg" => "mp3",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/flac" => "flac",
        "audio/aac" => "aac",
        _ => "bin",
    }
}

/// MIME type guessed from a file extension
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "webm" => Some("audio/webm"),
        "ogg" | "oga" | "opus" => Some("audio/ogg"),
        "m4a" | "mp4" => Some("audio/mp4"),
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "flac" => Some("audio/flac"),
        "aac" => Some("audio/aac"),
        _ => None,
    }
}

fn base_type(mime: &str) -> &str {
    mime.split(';').next().unwrap_or(mime).trim()
}
