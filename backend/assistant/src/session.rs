//! Session state for one continuous user interaction.

use uuid::Uuid;
use visionmate_core::{FeatureMode, SceneDescription, UploadedImage};

/// Injectable session store. The orchestrator only reaches session state
/// through this trait, so any UI can back it with its own storage.
pub trait SessionStore: Send {
    fn id(&self) -> &str;

    fn image(&self) -> Option<&UploadedImage>;
    fn set_image(&mut self, image: UploadedImage);
    fn clear_image(&mut self);

    fn description(&self) -> Option<&SceneDescription>;
    fn set_description(&mut self, description: SceneDescription);

    fn mode(&self) -> FeatureMode;
    fn set_mode(&mut self, mode: FeatureMode);
}

/// Default store: plain fields, lives as long as the interaction.
#[derive(Debug, Clone)]
pub struct InMemorySession {
    id: String,
    image: Option<UploadedImage>,
    description: Option<SceneDescription>,
    mode: FeatureMode,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: None,
            description: None,
            mode: FeatureMode::default(),
        }
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    fn set_image(&mut self, image: UploadedImage) {
        self.image = Some(image);
    }

    fn clear_image(&mut self) {
        self.image = None;
    }

    fn description(&self) -> Option<&SceneDescription> {
        self.description.as_ref()
    }

    fn set_description(&mut self, description: SceneDescription) {
        self.description = Some(description);
    }

    fn mode(&self) -> FeatureMode {
        self.mode
    }

    fn set_mode(&mut self, mode: FeatureMode) {
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_empty() {
        let session = InMemorySession::new();
        assert!(session.image().is_none());
        assert!(session.description().is_none());
        assert_eq!(session.mode(), FeatureMode::DescribeScene);
        assert!(!session.id().is_empty());
    }

    #[test]
    fn replacing_image_keeps_description() {
        let mut session = InMemorySession::with_id("s");
        let first = UploadedImage::new("a.png", "image/png", vec![1u8]);
        session.set_description(SceneDescription::new("a cat", first.id));
        session.set_image(first);
        session.set_image(UploadedImage::new("b.png", "image/png", vec![2u8]));
        assert_eq!(session.image().unwrap().name, "b.png");
        assert_eq!(session.description().unwrap().text, "a cat");
    }
}
