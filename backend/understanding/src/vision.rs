//! Scene description through a hosted vision-language model.
//!
//! One instruction and one inline image per request. Every failure surfaces
//! as `VisionError::Inference`; there is no retry.
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use visionmate_core::{ImagePayload, SceneDescriber, VisionError};
use visionmate_logging::redact_sensitive_data;

/// Instruction sent with every scene description request.
pub const DEFAULT_SCENE_INSTRUCTION: &str = "You are an AI assistant helping visually impaired \
individuals by describing the scene in the image. Provide:
1. Contextual information about the real-life presence of the image.
2. Identify the things, people, and places by accessing the information from your database.";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Supported vision providers.
#[derive(Debug, Clone)]
pub enum VisionProvider {
    OpenAI { api_key: String, model: String },
    Gemini { api_key: String, model: String },
}

impl VisionProvider {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAI { api_key: api_key.into(), model: DEFAULT_OPENAI_MODEL.to_string() }
    }
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::Gemini { api_key: api_key.into(), model: DEFAULT_GEMINI_MODEL.to_string() }
    }
}

/// Build the describer for a provider on top of a shared HTTP client.
pub fn create_describer(
    provider: VisionProvider,
    client: Client,
    max_output_tokens: Option<u32>,
) -> Box<dyn SceneDescriber> {
    match provider {
        VisionProvider::OpenAI { api_key, model } => Box::new(
            OpenAiDescriber::new(api_key, model)
                .with_client(client)
                .with_max_tokens(max_output_tokens),
        ),
        VisionProvider::Gemini { api_key, model } => Box::new(
            GeminiDescriber::new(api_key, model)
                .with_client(client)
                .with_max_output_tokens(max_output_tokens),
        ),
    }
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

pub struct GeminiDescriber {
    api_key: String,
    model: String,
    base_url: String,
    max_output_tokens: Option<u32>,
    client: Client,
}

impl GeminiDescriber {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            max_output_tokens: None,
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

    pub fn with_max_output_tokens(mut self, max: Option<u32>) -> Self {
        self.max_output_tokens = max;
        self
    }

    fn request_body(&self, instruction: &str, image: &ImagePayload) -> Value {
        let mut body = serde_json::json!({
            "contents": [{ "parts": [
                { "text": instruction },
                { "inlineData": { "mimeType": image.mime_type, "data": STANDARD.encode(&image.data) } }
            ]}]
        });
        if let Some(max) = self.max_output_tokens {
            body["generationConfig"] = serde_json::json!({ "maxOutputTokens": max });
        }
        body
    }
}

#[async_trait]
impl SceneDescriber for GeminiDescriber {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn describe(&self, instruction: &str, image: &ImagePayload) -> Result<String, VisionError> {
        info!(model = %self.model, bytes = image.data.len(), "[Vision] Describing image via Gemini");
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(instruction, image))
            .send()
            .await
            .map_err(inference_error)?;
        let json = read_json(resp, "Gemini").await?;
        parse_gemini_response(&json)
    }
}

/// Concatenate the text parts of the first candidate.
pub fn parse_gemini_response(json: &Value) -> Result<String, VisionError> {
    let text: String = json["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();
    if !text.trim().is_empty() {
        return Ok(text);
    }
    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        return Err(VisionError::Inference(format!("request blocked by Gemini: {reason}")));
    }
    if let Some(reason) = json["candidates"][0]["finishReason"].as_str() {
        return Err(VisionError::Inference(format!(
            "Gemini returned no text (finish reason {reason})"
        )));
    }
    Err(VisionError::Inference("Gemini response contained no text".into()))
}

// ---------------------------------------------------------------------------
// OpenAI
// ---------------------------------------------------------------------------

pub struct OpenAiDescriber {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: Client,
}

impl OpenAiDescriber {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            max_tokens: 1024,
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

    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        if let Some(max) = max {
            self.max_tokens = max;
        }
        self
    }
}

#[async_trait]
impl SceneDescriber for OpenAiDescriber {
    fn name(&self) -> &str {
        "openai"
    }

    async fn describe(&self, instruction: &str, image: &ImagePayload) -> Result<String, VisionError> {
        info!(model = %self.model, bytes = image.data.len(), "[Vision] Describing image via OpenAI");
        let data_uri = format!("data:{};base64,{}", image.mime_type, STANDARD.encode(&image.data));
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": instruction },
                    { "type": "image_url", "image_url": { "url": data_uri } }
                ]
            }],
            "max_tokens": self.max_tokens
        });
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(inference_error)?;
        let json = read_json(resp, "OpenAI").await?;
        parse_openai_response(&json)
    }
}

pub fn parse_openai_response(json: &Value) -> Result<String, VisionError> {
    match json["choices"][0]["message"]["content"].as_str() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(VisionError::Inference("OpenAI response contained no text".into())),
    }
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn inference_error(e: reqwest::Error) -> VisionError {
    VisionError::Inference(e.without_url().to_string())
}

async fn read_json(resp: reqwest::Response, provider: &str) -> Result<Value, VisionError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        debug!(%status, body = %redact_sensitive_data(&body), "{provider} vision error body");
        return Err(VisionError::Inference(format!(
            "{provider} vision error ({status}): {}",
            api_error_message(&body)
        )));
    }
    resp.json().await.map_err(|e| {
        VisionError::Inference(format!("malformed {provider} response: {}", e.without_url()))
    })
}

/// Pull `error.message` out of a JSON error body, falling back to the raw text.
/// Credentials echoed by the provider are masked.
fn api_error_message(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());
    redact_sensitive_data(&message)
}
