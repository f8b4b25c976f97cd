//! Wires configured adapters into an orchestrator.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;
use visionmate_assistant::Orchestrator;
use visionmate_config::{SpeechProviderKind, VisionMateConfig, VisionProviderKind};
use visionmate_core::{AudioFormat, UploadedImage};
use visionmate_media::{detect_mime_type, is_image, ImageIntake, DEFAULT_MAX_IMAGE_BYTES};
use visionmate_tts::{create_tts, AudioFileSynthesizer, TtsProviderKind};
use visionmate_understanding::{
    create_describer, ImageTextExtractor, TesseractEngine, VisionProvider, DEFAULT_GEMINI_MODEL,
    DEFAULT_OPENAI_MODEL, DEFAULT_SCENE_INSTRUCTION,
};

pub fn http_client(config: &VisionMateConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.network.request_timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to build HTTP client")
}

pub fn tesseract_engine(config: &VisionMateConfig) -> TesseractEngine {
    let command = config
        .ocr
        .tesseract_path
        .clone()
        .unwrap_or_else(|| "tesseract".into());
    TesseractEngine::new(command)
        .with_language(config.ocr.language.as_deref().unwrap_or("eng"))
        .with_timeout(config.network.request_timeout())
}

/// Build the orchestrator from a validated config.
pub fn build_orchestrator(config: &VisionMateConfig) -> Result<Orchestrator> {
    let client = http_client(config)?;

    let api_key = config
        .vision
        .api_key
        .clone()
        .context("vision.apiKey is not set")?;
    let provider = match config.vision.provider {
        VisionProviderKind::Gemini => VisionProvider::Gemini {
            api_key,
            model: config.vision.model.clone().unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
        },
        VisionProviderKind::OpenAi => VisionProvider::OpenAI {
            api_key,
            model: config.vision.model.clone().unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
        },
    };
    let describer = create_describer(provider, client.clone(), config.vision.max_output_tokens);

    let tts_kind = match config.speech.provider {
        SpeechProviderKind::GoogleTranslate => TtsProviderKind::GoogleTranslate,
        SpeechProviderKind::OpenAi => TtsProviderKind::OpenAi {
            api_key: config
                .speech
                .api_key
                .clone()
                .context("speech.apiKey is required for the openai provider")?,
            model: config.speech.model.clone(),
            voice: config.speech.voice.clone(),
        },
    };
    let format = config
        .speech
        .format
        .as_deref()
        .map(str::parse::<AudioFormat>)
        .transpose()
        .map_err(anyhow::Error::msg)
        .context("Invalid speech.format")?
        .unwrap_or_default();
    let synthesizer = AudioFileSynthesizer::new(
        Arc::from(create_tts(tts_kind, client)),
        config.speech.language.as_deref().unwrap_or("en"),
    )
    .with_voice(config.speech.voice.clone())
    .with_speed(config.speech.speed.unwrap_or(1.0))
    .with_format(format);

    let extractor = ImageTextExtractor::new(tesseract_engine(config));

    info!(
        vision = ?config.vision.provider,
        speech = ?config.speech.provider,
        audio = format.extension(),
        "Adapters configured"
    );

    let instruction = config
        .vision
        .instruction
        .clone()
        .unwrap_or_else(|| DEFAULT_SCENE_INSTRUCTION.to_string());
    let intake = ImageIntake::new(config.intake.max_image_bytes.unwrap_or(DEFAULT_MAX_IMAGE_BYTES));

    Ok(Orchestrator::new(
        Arc::from(describer),
        Arc::new(extractor),
        Arc::new(synthesizer),
        instruction,
    )
    .with_intake(intake))
}

/// Read an image file into an upload. Unknown extensions leave the type
/// undeclared so intake sniffs the bytes.
pub async fn read_upload(path: &Path) -> Result<UploadedImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let detected = detect_mime_type(path);
    let media_type = if is_image(detected) { detected } else { "" };
    Ok(UploadedImage::new(name, media_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> VisionMateConfig {
        let mut config = VisionMateConfig::default();
        config.vision.api_key = Some("AIza-test".into());
        visionmate_config::apply_all_defaults(config)
    }

    #[test]
    fn builds_from_defaults() {
        assert!(build_orchestrator(&config_with_key()).is_ok());
    }

    #[test]
    fn openai_speech_needs_key() {
        let mut config = config_with_key();
        config.speech.provider = SpeechProviderKind::OpenAi;
        let err = build_orchestrator(&config).err().unwrap();
        assert!(err.to_string().contains("speech.apiKey"));
    }

    #[test]
    fn unknown_speech_format_is_rejected() {
        let mut config = config_with_key();
        config.speech.format = Some("ogg".into());
        let err = build_orchestrator(&config).err().unwrap();
        assert!(format!("{err:#}").contains("unknown audio format: ogg"));
    }

    #[tokio::test]
    async fn upload_type_comes_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("photo.png");
        std::fs::write(&png, b"\x89PNG\r\n\x1a\n").unwrap();
        let upload = read_upload(&png).await.unwrap();
        assert_eq!(upload.name, "photo.png");
        assert_eq!(upload.media_type, "image/png");

        let raw = dir.path().join("photo.bin");
        std::fs::write(&raw, b"\xFF\xD8\xFF\xE0").unwrap();
        assert_eq!(read_upload(&raw).await.unwrap().media_type, "");
    }

    #[tokio::test]
    async fn missing_file_is_error() {
        let err = read_upload(Path::new("/definitely/not/here.png")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
