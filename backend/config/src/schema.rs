//! VisionMate runtime configuration schema.
//!
//! Typed for serde YAML/JSON with camelCase keys. Most fields are optional in
//! the file; `defaults::apply_all_defaults` fills them after loading.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionMateConfig {
    /// Scene description service
    #[serde(default)]
    pub vision: VisionConfig,

    /// Text-to-speech engine
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Local OCR engine
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Outbound request limits
    #[serde(default)]
    pub network: NetworkConfig,

    /// Upload validation
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Audio playback in the terminal front end
    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Vision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisionProviderKind {
    #[default]
    Gemini,
    OpenAi,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionConfig {
    #[serde(default)]
    pub provider: VisionProviderKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// File holding the API key; read when `apiKey` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Replaces the built-in scene instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

// ---------------------------------------------------------------------------
// Speech
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeechProviderKind {
    #[default]
    GoogleTranslate,
    #[serde(rename = "openai")]
    OpenAi,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    #[serde(default)]
    pub provider: SpeechProviderKind,

    /// Target language code, e.g. "en".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,

    /// Audio container: mp3, opus, aac, flac or wav.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrConfig {
    /// Tesseract executable; a bare name is looked up on PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tesseract_path: Option<PathBuf>,

    /// Tesseract language pack, e.g. "eng".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

// ---------------------------------------------------------------------------
// Network / intake / player / logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Per-request timeout for every external call. 0 is rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_image_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    /// Command line used to play audio; the file path is appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for rolling JSON logs; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
vision:
  provider: openai
  apiKey: sk-test
  maxOutputTokens: 300
speech:
  provider: google-translate
  language: fr
ocr:
  tesseractPath: /usr/local/bin/tesseract
network:
  requestTimeoutSecs: 30
"#;
        let config: VisionMateConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.vision.provider, VisionProviderKind::OpenAi);
        assert_eq!(config.vision.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.vision.max_output_tokens, Some(300));
        assert_eq!(config.speech.provider, SpeechProviderKind::GoogleTranslate);
        assert_eq!(config.speech.language.as_deref(), Some("fr"));
        assert_eq!(
            config.ocr.tesseract_path,
            Some(PathBuf::from("/usr/local/bin/tesseract"))
        );
        assert_eq!(config.network.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let config: VisionMateConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.vision.provider, VisionProviderKind::Gemini);
        assert!(config.vision.api_key.is_none());
    }
}
