//! Temporary audio produced by speech synthesis.
//!
//! The handle owns its file. `release` deletes it and reports failures;
//! dropping an unreleased handle deletes it as well.

use std::io;
use std::path::Path;
use std::str::FromStr;

use tempfile::TempPath;
use tracing::debug;

/// Audio container written by the synthesizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AudioFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/opus",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wav => "wav",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" | "mpeg" => Ok(Self::Mp3),
            "opus" => Ok(Self::Opus),
            "aac" => Ok(Self::Aac),
            "flac" => Ok(Self::Flac),
            "wav" => Ok(Self::Wav),
            other => Err(format!("unknown audio format: {other}")),
        }
    }
}

/// A fully written audio file awaiting playback.
#[derive(Debug)]
pub struct TemporaryAudio {
    path: TempPath,
    format: AudioFormat,
    source_text: String,
}

impl TemporaryAudio {
    pub fn new(path: TempPath, format: AudioFormat, source_text: impl Into<String>) -> Self {
        Self {
            path,
            format,
            source_text: source_text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Delete the file now.
    pub fn release(self) -> io::Result<()> {
        debug!(path = %self.path.display(), "Releasing temporary audio");
        self.path.close()
    }
}
