//! Image intake: turn an upload into a transport-ready payload.

use std::path::Path;

use tracing::{debug, warn};
use visionmate_core::{ImagePayload, UploadedImage, VisionError};

use crate::mime_detect::{canonical_image_type, detect_mime_type, sniff_image_type};

/// Default upper bound on accepted image size (20 MiB, the inline limit of
/// the hosted vision APIs).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ImageIntake {
    max_bytes: usize,
}

impl Default for ImageIntake {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_BYTES)
    }
}

impl ImageIntake {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Validate an upload and produce `{bytes, mediaType}`.
    ///
    /// `None` means the user never uploaded anything. Types other than JPEG
    /// and PNG are rejected.
    pub fn normalize(&self, upload: Option<&UploadedImage>) -> Result<ImagePayload, VisionError> {
        let Some(upload) = upload else {
            return Err(VisionError::MissingInput("No file uploaded.".into()));
        };
        if upload.is_empty() {
            return Err(VisionError::MissingInput(format!(
                "Uploaded file '{}' is empty.",
                upload.name
            )));
        }
        if upload.len() > self.max_bytes {
            return Err(VisionError::UnsupportedMedia(format!(
                "'{}' is {} bytes, over the {} byte limit",
                upload.name,
                upload.len(),
                self.max_bytes
            )));
        }

        // A declared type is passed through as given; only an undeclared
        // upload gets a guessed type.
        let declared = upload.media_type.as_str();
        let media_type = if declared.trim().is_empty() {
            let guessed = sniff_image_type(&upload.bytes)
                .unwrap_or_else(|| detect_mime_type(Path::new(&upload.name)));
            debug!(name = %upload.name, guessed, "No declared media type; guessed from content");
            guessed
        } else {
            declared
        };

        let Some(canonical) = canonical_image_type(media_type) else {
            return Err(VisionError::UnsupportedMedia(format!(
                "'{}' has type {}; only JPEG and PNG are accepted",
                upload.name, media_type
            )));
        };

        if let Some(sniffed) = sniff_image_type(&upload.bytes) {
            if sniffed != canonical {
                warn!(name = %upload.name, declared = media_type, sniffed, "Declared type does not match content");
            }
        }

        Ok(ImagePayload {
            image_id: upload.id,
            mime_type: media_type.to_string(),
            data: upload.bytes.clone(),
        })
    }
}
