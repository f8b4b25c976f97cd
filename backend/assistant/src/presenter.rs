use async_trait::async_trait;
use visionmate_core::{TemporaryAudio, UploadedImage, VisionError};

/// Display commands the orchestrator issues. Implemented by whatever UI
/// hosts the session; the orchestrator assumes nothing about it.
#[async_trait]
pub trait Presenter: Send {
    fn show_image(&mut self, image: &UploadedImage);

    fn show_text(&mut self, title: &str, body: &str);

    fn show_warning(&mut self, message: &str);

    fn show_error(&mut self, message: &str);

    /// Play the file. The handle stays owned by the caller, which deletes
    /// it once this returns.
    async fn play_audio(&mut self, audio: &TemporaryAudio) -> Result<(), VisionError>;
}
