//! # Audio Artifacts
//!
//! The finalized audio of a capture session: either bytes recorded on this
//! device or a file the user picked. Both end up in the submission as a
//! base64 `data:` URL.

use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::egui_app::capture::encoding::{extension_for, mime_for_extension};

/// Type used for imported files with an unknown extension
const UNKNOWN_AUDIO_TYPE: &str = "application/octet-stream";

/// Encode bytes as a `data:` URL
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Audio recorded in this session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAudio {
    pub bytes: Vec<u8>,
    pub mime: String,
    /// Inline form of `bytes`, computed once at finalization
    pub data_url: String,
}

impl RecordedAudio {
    /// Concatenate fragments into one artifact
    pub fn from_fragments(fragments: Vec<Vec<u8>>, mime: &str) -> Self {
        let bytes = fragments.concat();
        let data_url = to_data_url(mime, &bytes);
        Self {
            bytes,
            mime: mime.to_string(),
            data_url,
        }
    }
}

/// A user-selected audio file, referenced rather than copied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedAudio {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: String,
    pub size: u64,
}

impl ImportedAudio {
    /// Describe the file at `path`
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a file"));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        let mime = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_for_extension)
            .unwrap_or(UNKNOWN_AUDIO_TYPE)
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            mime,
            size: metadata.len(),
        })
    }
}

/// Finalized audio of a capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioArtifact {
    Recorded(RecordedAudio),
    Imported(ImportedAudio),
}

impl AudioArtifact {
    pub fn mime(&self) -> &str {
        match self {
            AudioArtifact::Recorded(audio) => &audio.mime,
            AudioArtifact::Imported(file) => &file.mime,
        }
    }

    /// Byte length of the audio
    pub fn size(&self) -> u64 {
        match self {
            AudioArtifact::Recorded(audio) => audio.bytes.len() as u64,
            AudioArtifact::Imported(file) => file.size,
        }
    }

    /// File name sent alongside the audio
    pub fn file_name(&self) -> String {
        match self {
            AudioArtifact::Recorded(audio) => format!("interview.{}", extension_for(&audio.mime)),
            AudioArtifact::Imported(file) => file.file_name.clone(),
        }
    }

    /// Inline representation. Imported files are read at this point.
    pub fn to_data_url(&self) -> io::Result<String> {
        match self {
            AudioArtifact::Recorded(audio) => Ok(audio.data_url.clone()),
            AudioArtifact::Imported(file) => {
                let bytes = std::fs::read(&file.path)?;
                Ok(to_data_url(&file.mime, &bytes))
            }
        }
    }
}
