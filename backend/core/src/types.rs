use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An image as the user handed it over, before intake.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub id: Uuid,
    /// Original file name, for display only.
    pub name: String,
    /// Declared media type; may be empty when the source gave none.
    pub media_type: String,
    pub bytes: Bytes,
}

impl UploadedImage {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Transport-ready image: raw bytes plus the media type sent to remote services.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub image_id: Uuid,
    pub mime_type: String,
    pub data: Bytes,
}

/// Generated scene text. Refers to its source image by id only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SceneDescription {
    pub text: String,
    pub source_image: Uuid,
    pub created_at: DateTime<Utc>,
}

impl SceneDescription {
    pub fn new(text: impl Into<String>, source_image: Uuid) -> Self {
        Self {
            text: text.into(),
            source_image,
            created_at: Utc::now(),
        }
    }
}

/// Text recognized by OCR. Shown once, never stored in the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The three mutually exclusive features a user can pick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    #[default]
    DescribeScene,
    TextToSpeech,
    ImageToText,
}

impl FeatureMode {
    /// Label used in menus and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DescribeScene => "Describe Scene",
            Self::TextToSpeech => "Text-to-Speech",
            Self::ImageToText => "Image to Text",
        }
    }
}

impl fmt::Display for FeatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FeatureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "describe" | "describe_scene" | "scene" => Ok(Self::DescribeScene),
            "speak" | "tts" | "text_to_speech" => Ok(Self::TextToSpeech),
            "ocr" | "text" | "image_to_text" => Ok(Self::ImageToText),
            other => Err(format!("unknown feature mode: {other}")),
        }
    }
}
