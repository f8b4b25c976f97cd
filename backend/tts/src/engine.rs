//! TTS provider trait and implementations (Google Translate TTS + OpenAI TTS).

use anyhow::{bail, Result};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};
use visionmate_core::AudioFormat;

use crate::chunk::split_for_tts;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A TTS request.
#[derive(Debug, Clone)]
pub struct TtsRequest {
    pub text: String,
    /// BCP-47 style language code, e.g. "en".
    pub language: String,
    pub voice: Option<String>,
    pub format: AudioFormat,
    pub speed: f32,
}

impl Default for TtsRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            language: "en".to_string(),
            voice: None,
            format: AudioFormat::Mp3,
            speed: 1.0,
        }
    }
}

/// Returns raw audio bytes.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes>;
}

// ---------------------------------------------------------------------------
// Google Translate TTS
// ---------------------------------------------------------------------------

/// Longest text the translate endpoint accepts per request.
pub const GOOGLE_TTS_MAX_CHARS: usize = 100;

const GOOGLE_TTS_URL: &str = "https://translate.google.com/translate_tts";

/// The unauthenticated Google Translate voice. MP3 only; long text is sent
/// in chunks and the segments are concatenated.
pub struct GoogleTranslateTts {
    base_url: String,
    client: Client,
}

impl GoogleTranslateTts {
    pub fn new() -> Self {
        Self {
            base_url: GOOGLE_TTS_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for GoogleTranslateTts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtsProvider for GoogleTranslateTts {
    fn name(&self) -> &str {
        "google-translate"
    }

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes> {
        if req.format != AudioFormat::Mp3 {
            bail!("Google Translate TTS only produces MP3, not {}", req.format.extension());
        }
        let chunks = split_for_tts(&req.text, GOOGLE_TTS_MAX_CHARS);
        if chunks.is_empty() {
            bail!("No text to speak");
        }
        let speed = if req.speed < 1.0 { "0.24" } else { "1" };
        info!(lang = %req.language, chunks = chunks.len(), "[TTS/Google] Synthesizing");

        let mut audio = BytesMut::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let query = [
                ("ie", "UTF-8".to_string()),
                ("q", chunk.clone()),
                ("tl", req.language.clone()),
                ("client", "tw-ob".to_string()),
                ("ttsspeed", speed.to_string()),
                ("total", chunks.len().to_string()),
                ("idx", idx.to_string()),
                ("textlen", chunk.chars().count().to_string()),
            ];
            let bytes = self
                .client
                .get(&self.base_url)
                .query(&query)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;
            debug!(idx, len = bytes.len(), "[TTS/Google] Received segment");
            audio.extend_from_slice(&bytes);
        }
        Ok(audio.freeze())
    }
}

// ---------------------------------------------------------------------------
// OpenAI TTS
// ---------------------------------------------------------------------------

pub struct OpenAiTts {
    api_key: String,
    model: String,
    default_voice: String,
    client: Client,
}

impl OpenAiTts {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "tts-1".to_string(),
            default_voice: "nova".to_string(),
            client: Client::new(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.default_voice = voice.into();
        self
    }
}

#[derive(Serialize)]
struct OpenAiTtsBody {
    model: String,
    input: String,
    voice: String,
    response_format: String,
    speed: f32,
}

#[async_trait]
impl TtsProvider for OpenAiTts {
    fn name(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes> {
        // The speech endpoint infers language from the input text.
        let body = OpenAiTtsBody {
            model: self.model.clone(),
            input: req.text,
            voice: req.voice.unwrap_or_else(|| self.default_voice.clone()),
            response_format: req.format.extension().to_string(),
            speed: req.speed,
        };
        info!("[TTS/OpenAI] Synthesizing with model={}", body.model);
        let bytes = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

pub enum TtsProviderKind {
    GoogleTranslate,
    OpenAi { api_key: String, model: Option<String>, voice: Option<String> },
}

pub fn create_tts(kind: TtsProviderKind, client: Client) -> Box<dyn TtsProvider> {
    match kind {
        TtsProviderKind::GoogleTranslate => Box::new(GoogleTranslateTts::new().with_client(client)),
        TtsProviderKind::OpenAi { api_key, model, voice } => {
            let mut tts = OpenAiTts::new(api_key).with_client(client);
            if let Some(model) = model {
                tts = tts.with_model(model);
            }
            if let Some(voice) = voice {
                tts = tts.with_voice(voice);
            }
            Box::new(tts)
        }
    }
}
