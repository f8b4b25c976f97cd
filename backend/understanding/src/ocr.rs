//! Optical Character Recognition (OCR)
//!
//! Decodes uploaded image bytes into a bitmap and hands it to a recognition
//! engine. The default engine drives a local Tesseract install.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tokio::process::Command;
use tracing::{debug, info, warn};
use visionmate_core::{ExtractedText, TextExtractor, VisionError};

/// Recognizes text in an already decoded bitmap.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(&self, image: &DynamicImage) -> Result<String, VisionError>;
}

/// `TextExtractor` over raw bytes: decode, recognize, tidy the output.
pub struct ImageTextExtractor<E> {
    engine: E,
}

impl<E: OcrEngine> ImageTextExtractor<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl<E: OcrEngine> TextExtractor for ImageTextExtractor<E> {
    async fn extract_text(&self, image_bytes: &[u8]) -> Result<ExtractedText, VisionError> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| VisionError::Extraction(format!("could not decode image: {e}")))?;
        info!(
            engine = self.engine.name(),
            width = image.width(),
            height = image.height(),
            "Running OCR"
        );
        let raw = self.engine.recognize(&image).await?;
        Ok(ExtractedText::new(clean_ocr_output(&raw)))
    }
}

/// Strip surrounding whitespace and the page-break form feeds Tesseract emits.
pub fn clean_ocr_output(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\x0c')
        .to_string()
}

// ---------------------------------------------------------------------------
// Tesseract
// ---------------------------------------------------------------------------

pub struct TesseractEngine {
    command: PathBuf,
    language: String,
    timeout: Option<Duration>,
}

impl TesseractEngine {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            language: "eng".to_string(),
            timeout: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `tesseract --version` and return its first line.
    pub async fn version(&self) -> Result<String, VisionError> {
        let output = Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;
        let text = if output.stdout.is_empty() { output.stderr } else { output.stdout };
        Ok(String::from_utf8_lossy(&text)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string())
    }

    fn spawn_error(&self, e: io::Error) -> VisionError {
        match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                VisionError::EngineUnavailable(format!("{}: {e}", self.command.display()))
            }
            _ => VisionError::Extraction(format!("failed to run {}: {e}", self.command.display())),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<String, VisionError> {
        let mut input = tempfile::Builder::new()
            .prefix("visionmate-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| VisionError::Extraction(format!("could not stage image: {e}")))?;
        image
            .write_to(input.as_file_mut(), ImageFormat::Png)
            .map_err(|e| VisionError::Extraction(format!("could not stage image: {e}")))?;

        debug!(path = %input.path().display(), lang = %self.language, "Invoking tesseract");
        let run = Command::new(&self.command)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                VisionError::Extraction(format!("tesseract timed out after {}s", limit.as_secs()))
            })?,
            None => run.await,
        }
        .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, stderr = %stderr, "tesseract failed");
            // Missing language data is an install problem, not a bad image.
            if stderr.contains("Error opening data file") || stderr.contains("Failed loading language") {
                return Err(VisionError::EngineUnavailable(stderr));
            }
            return Err(VisionError::Extraction(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
