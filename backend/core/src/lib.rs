pub mod audio;
pub mod error;
pub mod traits;
pub mod types;

pub use audio::{AudioFormat, TemporaryAudio};
pub use error::{Severity, VisionError};
pub use traits::{SceneDescriber, SpeechSynthesizer, TextExtractor};
pub use types::{ExtractedText, FeatureMode, ImagePayload, SceneDescription, UploadedImage};
