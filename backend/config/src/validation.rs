//! Config validation: deep schema checks with user-friendly error messages.

use crate::schema::{SpeechProviderKind, VisionMateConfig};
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a defaulted config and return every error and warning.
pub fn validate(config: &VisionMateConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_vision(config, &mut report);
    validate_speech(config, &mut report);
    validate_ocr(config, &mut report);
    validate_runtime(config, &mut report);
    report
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn validate_vision(config: &VisionMateConfig, report: &mut ValidationReport) {
    if is_blank(&config.vision.api_key) {
        report.error(
            "vision.apiKey",
            "No vision API key configured; set vision.apiKey, vision.apiKeyFile or GEMINI_API_KEY",
        );
    }
    if is_blank(&config.vision.model) {
        report.error("vision.model", "Model name cannot be empty");
    }
    if let Some(instruction) = &config.vision.instruction {
        if instruction.trim().is_empty() {
            report.error("vision.instruction", "Instruction override cannot be empty");
        }
    }
    if config.vision.max_output_tokens == Some(0) {
        report.error("vision.maxOutputTokens", "Must be greater than zero");
    }
}

fn validate_speech(config: &VisionMateConfig, report: &mut ValidationReport) {
    if config.speech.provider == SpeechProviderKind::OpenAi && is_blank(&config.speech.api_key) {
        report.error("speech.apiKey", "OpenAI speech requires an API key (or OPENAI_API_KEY)");
    }
    if is_blank(&config.speech.language) {
        report.error("speech.language", "Language code cannot be empty");
    }
    if let Some(speed) = config.speech.speed {
        if !(0.25..=4.0).contains(&speed) {
            report.error("speech.speed", "Speed must be between 0.25 and 4.0");
        }
    }
    if let Some(format) = config.speech.format.as_deref() {
        let format = format.trim().to_ascii_lowercase();
        if !SPEECH_FORMATS.contains(&format.as_str()) {
            report.error(
                "speech.format",
                format!("Unknown audio format '{format}'; expected one of {SPEECH_FORMATS:?}"),
            );
        } else if config.speech.provider == SpeechProviderKind::GoogleTranslate && format != "mp3" {
            report.error("speech.format", "Google Translate speech only produces mp3");
        }
    }
}

const SPEECH_FORMATS: &[&str] = &["mp3", "opus", "aac", "flac", "wav"];

fn validate_ocr(config: &VisionMateConfig, report: &mut ValidationReport) {
    if is_blank(&config.ocr.language) {
        report.error("ocr.language", "Tesseract language cannot be empty");
    }
    if let Some(path) = &config.ocr.tesseract_path {
        if path.is_absolute() && !path.exists() {
            report.warn(
                "ocr.tesseractPath",
                format!("{} does not exist; text extraction will fail", path.display()),
            );
        }
    }
}

fn validate_runtime(config: &VisionMateConfig, report: &mut ValidationReport) {
    if config.network.request_timeout_secs == Some(0) {
        report.error("network.requestTimeoutSecs", "Timeout must be at least one second");
    }
    if config.intake.max_image_bytes == Some(0) {
        report.error("intake.maxImageBytes", "Limit must be greater than zero");
    }
    if is_blank(&config.player.command) {
        report.warn("player.command", "No audio player configured; speech cannot be played");
    }
}
