use thiserror::Error;

/// Every failure an adapter or the intake step can report.
///
/// Adapters never display anything; they hand one of these back and the
/// orchestrator turns it into a user-visible message.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The user skipped a required upload or prior step.
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("unsupported media: {0}")]
    UnsupportedMedia(String),

    /// A local engine (e.g. tesseract) could not be located or started.
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("scene inference failed: {0}")]
    Inference(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("audio playback failed: {0}")]
    Playback(String),
}

/// Coarse classification used for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user can fix it (upload something, run another step first).
    UserCorrectable,
    /// Broken environment; stays broken until an operator intervenes.
    Fatal,
    /// An external call failed; the interaction remains usable.
    Transient,
}

impl VisionError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingInput(_) | Self::UnsupportedMedia(_) => Severity::UserCorrectable,
            Self::EngineUnavailable(_) => Severity::Fatal,
            Self::Extraction(_) | Self::Inference(_) | Self::Synthesis(_) | Self::Playback(_) => {
                Severity::Transient
            }
        }
    }

    /// Text shown to the user by the presentation layer.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingInput(msg) => msg.clone(),
            Self::UnsupportedMedia(msg) => format!("Unsupported image: {msg}"),
            Self::EngineUnavailable(_) => "Tesseract is not installed or not configured properly. \
                 Please install Tesseract and configure the correct path."
                .to_string(),
            Self::Extraction(msg) => format!("An error occurred while extracting text: {msg}"),
            Self::Inference(msg) | Self::Synthesis(msg) | Self::Playback(msg) => {
                format!("Error: {msg}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_missing_message_differs_from_generic_extraction() {
        let missing = VisionError::EngineUnavailable("tesseract: not found".into()).user_message();
        let generic = VisionError::Extraction("corrupt png".into()).user_message();
        assert!(missing.contains("Tesseract is not installed"));
        assert!(generic.starts_with("An error occurred while extracting text"));
        assert!(generic.contains("corrupt png"));
        assert_ne!(missing, generic);
    }

    #[test]
    fn severity_classification() {
        assert_eq!(
            VisionError::MissingInput("x".into()).severity(),
            Severity::UserCorrectable
        );
        assert_eq!(
            VisionError::EngineUnavailable("x".into()).severity(),
            Severity::Fatal
        );
        assert_eq!(VisionError::Inference("x".into()).severity(), Severity::Transient);
    }
}
