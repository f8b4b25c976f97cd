use async_trait::async_trait;

use crate::audio::TemporaryAudio;
use crate::error::VisionError;
use crate::types::{ExtractedText, ImagePayload};

/// Vision-language service: one instruction plus one image in, text out.
#[async_trait]
pub trait SceneDescriber: Send + Sync {
    /// Provider name for logs (e.g. "gemini").
    fn name(&self) -> &str;

    async fn describe(&self, instruction: &str, image: &ImagePayload) -> Result<String, VisionError>;
}

/// Text recognition over encoded image bytes.
///
/// Returns empty text, not an error, when the image holds no text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image_bytes: &[u8]) -> Result<ExtractedText, VisionError>;
}

/// Text-to-speech into a temporary file owned by the caller.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<TemporaryAudio, VisionError>;
}
