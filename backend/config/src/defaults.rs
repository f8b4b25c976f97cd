//! Config defaults: applies sensible default values to parsed config.

use std::path::PathBuf;

use crate::schema::{VisionMateConfig, VisionProviderKind};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_OPENAI_VISION_MODEL: &str = "gpt-4o";
pub const DEFAULT_SPEECH_LANGUAGE: &str = "en";
pub const DEFAULT_SPEECH_FORMAT: &str = "mp3";
pub const DEFAULT_TESSERACT: &str = "tesseract";
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Default timeout for each external call (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default upload limit (20 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: VisionMateConfig) -> VisionMateConfig {
    let config = apply_vision_defaults(config);
    let config = apply_speech_defaults(config);
    let config = apply_ocr_defaults(config);
    apply_runtime_defaults(config)
}

fn apply_vision_defaults(mut config: VisionMateConfig) -> VisionMateConfig {
    if config.vision.model.is_none() {
        let model = match config.vision.provider {
            VisionProviderKind::Gemini => DEFAULT_GEMINI_MODEL,
            VisionProviderKind::OpenAi => DEFAULT_OPENAI_VISION_MODEL,
        };
        config.vision.model = Some(model.to_string());
    }
    config
}

fn apply_speech_defaults(mut config: VisionMateConfig) -> VisionMateConfig {
    config
        .speech
        .language
        .get_or_insert_with(|| DEFAULT_SPEECH_LANGUAGE.to_string());
    config.speech.speed.get_or_insert(1.0);
    config
        .speech
        .format
        .get_or_insert_with(|| DEFAULT_SPEECH_FORMAT.to_string());
    config
}

fn apply_ocr_defaults(mut config: VisionMateConfig) -> VisionMateConfig {
    config
        .ocr
        .tesseract_path
        .get_or_insert_with(|| PathBuf::from(DEFAULT_TESSERACT));
    config
        .ocr
        .language
        .get_or_insert_with(|| DEFAULT_OCR_LANGUAGE.to_string());
    config
}

/// Network, intake, player and logging.
fn apply_runtime_defaults(mut config: VisionMateConfig) -> VisionMateConfig {
    config
        .network
        .request_timeout_secs
        .get_or_insert(DEFAULT_REQUEST_TIMEOUT_SECS);
    config
        .intake
        .max_image_bytes
        .get_or_insert(DEFAULT_MAX_IMAGE_BYTES);
    if config.player.command.is_none() {
        config.player.command = default_player_command().map(str::to_string);
    }
    config
        .logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}

/// Platform audio player used when none is configured.
pub fn default_player_command() -> Option<&'static str> {
    if cfg!(target_os = "macos") {
        Some("afplay")
    } else if cfg!(target_os = "linux") {
        Some("ffplay -nodisp -autoexit -loglevel quiet")
    } else {
        None
    }
}
