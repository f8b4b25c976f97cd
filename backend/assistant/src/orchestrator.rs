//! Session orchestrator: routes the selected feature to its adapter.
//!
//! One action runs to completion before the next is accepted. Adapter
//! failures never clear or overwrite existing session state, and every
//! failure ends in a visible message.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use visionmate_core::{
    FeatureMode, ImagePayload, SceneDescriber, SceneDescription, SpeechSynthesizer, TextExtractor,
    UploadedImage, VisionError,
};
use visionmate_logging::{redact_sensitive_data, EventLogger, SessionEvent};
use visionmate_media::ImageIntake;

use crate::presenter::Presenter;
use crate::session::SessionStore;

pub const NEED_IMAGE: &str = "Please upload an image first.";
pub const NEED_DESCRIPTION: &str = "Please generate the scene description first.";

/// How a user action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// A precondition was missing; no adapter was called.
    Warned,
    Failed,
}

pub struct Orchestrator {
    intake: ImageIntake,
    describer: Arc<dyn SceneDescriber>,
    extractor: Arc<dyn TextExtractor>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    instruction: String,
}

impl Orchestrator {
    pub fn new(
        describer: Arc<dyn SceneDescriber>,
        extractor: Arc<dyn TextExtractor>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            intake: ImageIntake::default(),
            describer,
            extractor,
            synthesizer,
            instruction: instruction.into(),
        }
    }

    pub fn with_intake(mut self, intake: ImageIntake) -> Self {
        self.intake = intake;
        self
    }

    /// Store a new upload, or forget the current one when `None`.
    pub fn upload(
        &self,
        session: &mut dyn SessionStore,
        presenter: &mut dyn Presenter,
        upload: Option<UploadedImage>,
    ) {
        match upload {
            Some(image) => {
                EventLogger::log_event(
                    session.id(),
                    SessionEvent::ImageUploaded {
                        name: image.name.clone(),
                        media_type: image.media_type.clone(),
                        bytes: image.len(),
                    },
                );
                presenter.show_image(&image);
                session.set_image(image);
            }
            None => {
                EventLogger::log_event(session.id(), SessionEvent::ImageCleared);
                session.clear_image();
            }
        }
    }

    /// Switch feature. Never triggers an action by itself.
    pub fn select_mode(&self, session: &mut dyn SessionStore, mode: FeatureMode) {
        EventLogger::log_event(
            session.id(),
            SessionEvent::ModeSelected { mode: mode_key(mode) },
        );
        session.set_mode(mode);
    }

    /// Run the action for the session's current mode.
    pub async fn run(
        &self,
        session: &mut dyn SessionStore,
        presenter: &mut dyn Presenter,
    ) -> ActionOutcome {
        match session.mode() {
            FeatureMode::DescribeScene => self.describe_scene(session, presenter).await,
            FeatureMode::TextToSpeech => self.speak_description(session, presenter).await,
            FeatureMode::ImageToText => self.extract_text(session, presenter).await,
        }
    }

    #[instrument(skip_all, fields(session_id = %session.id()))]
    pub async fn describe_scene(
        &self,
        session: &mut dyn SessionStore,
        presenter: &mut dyn Presenter,
    ) -> ActionOutcome {
        let mode = FeatureMode::DescribeScene;
        let payload = match self.require_image(session, presenter, mode) {
            Ok(payload) => payload,
            Err(outcome) => return outcome,
        };

        self.started(session, mode);
        match self.describer.describe(&self.instruction, &payload).await {
            Ok(text) => {
                info!(provider = self.describer.name(), chars = text.len(), "Scene described");
                presenter.show_text("Scene Description", &text);
                self.completed(session, mode, text.len());
                session.set_description(SceneDescription::new(text, payload.image_id));
                ActionOutcome::Completed
            }
            Err(e) => self.report(session, presenter, mode, e),
        }
    }

    #[instrument(skip_all, fields(session_id = %session.id()))]
    pub async fn speak_description(
        &self,
        session: &mut dyn SessionStore,
        presenter: &mut dyn Presenter,
    ) -> ActionOutcome {
        let mode = FeatureMode::TextToSpeech;
        let Some(text) = session.description().map(|d| d.text.clone()) else {
            return self.warn(session, presenter, mode, NEED_DESCRIPTION);
        };

        self.started(session, mode);
        let audio = match self.synthesizer.synthesize(&text).await {
            Ok(audio) => audio,
            Err(e) => return self.report(session, presenter, mode, e),
        };

        let played = presenter.play_audio(&audio).await;
        let released = audio.release();
        EventLogger::log_event(session.id(), SessionEvent::AudioReleased { ok: released.is_ok() });
        if let Err(e) = released {
            warn!(error = %e, "Failed to delete temporary audio");
            presenter.show_warning(&format!("Could not delete temporary audio file: {e}"));
        }

        match played {
            Ok(()) => {
                self.completed(session, mode, text.len());
                ActionOutcome::Completed
            }
            Err(e) => self.report(session, presenter, mode, e),
        }
    }

    /// OCR the current image. The text is displayed, never stored.
    #[instrument(skip_all, fields(session_id = %session.id()))]
    pub async fn extract_text(
        &self,
        session: &mut dyn SessionStore,
        presenter: &mut dyn Presenter,
    ) -> ActionOutcome {
        let mode = FeatureMode::ImageToText;
        let payload = match self.require_image(session, presenter, mode) {
            Ok(payload) => payload,
            Err(outcome) => return outcome,
        };

        self.started(session, mode);
        match self.extractor.extract_text(&payload.data).await {
            Ok(extracted) => {
                info!(empty = extracted.is_empty(), "Text extracted");
                presenter.show_text("Extracted Text", &extracted.text);
                self.completed(session, mode, extracted.text.len());
                ActionOutcome::Completed
            }
            Err(e) => self.report(session, presenter, mode, e),
        }
    }

    /// Image precondition plus intake. `Err` carries the outcome already reported.
    fn require_image(
        &self,
        session: &dyn SessionStore,
        presenter: &mut dyn Presenter,
        mode: FeatureMode,
    ) -> Result<ImagePayload, ActionOutcome> {
        if session.image().is_none() {
            return Err(self.warn(session, presenter, mode, NEED_IMAGE));
        }
        self.intake
            .normalize(session.image())
            .map_err(|e| self.report(session, presenter, mode, e))
    }

    fn started(&self, session: &dyn SessionStore, mode: FeatureMode) {
        EventLogger::log_event(session.id(), SessionEvent::ActionStarted { mode: mode_key(mode) });
    }

    fn completed(&self, session: &dyn SessionStore, mode: FeatureMode, output_chars: usize) {
        EventLogger::log_event(
            session.id(),
            SessionEvent::ActionCompleted { mode: mode_key(mode), output_chars },
        );
    }

    fn warn(
        &self,
        session: &dyn SessionStore,
        presenter: &mut dyn Presenter,
        mode: FeatureMode,
        message: &str,
    ) -> ActionOutcome {
        EventLogger::log_event(
            session.id(),
            SessionEvent::ActionWarned { mode: mode_key(mode), message: message.to_string() },
        );
        presenter.show_warning(message);
        ActionOutcome::Warned
    }

    /// Map an adapter error to a message. User-correctable input problems
    /// are warnings; everything else is an error.
    fn report(
        &self,
        session: &dyn SessionStore,
        presenter: &mut dyn Presenter,
        mode: FeatureMode,
        err: VisionError,
    ) -> ActionOutcome {
        if let VisionError::MissingInput(message) = &err {
            return self.warn(session, presenter, mode, message);
        }
        let detail = redact_sensitive_data(&err.to_string());
        warn!(mode = %mode, error = %detail, severity = ?err.severity(), "Action failed");
        EventLogger::log_event(
            session.id(),
            SessionEvent::ActionFailed { mode: mode_key(mode), error_msg: err.to_string() },
        );
        presenter.show_error(&redact_sensitive_data(&err.user_message()));
        ActionOutcome::Failed
    }
}

fn mode_key(mode: FeatureMode) -> String {
    match mode {
        FeatureMode::DescribeScene => "describe_scene",
        FeatureMode::TextToSpeech => "text_to_speech",
        FeatureMode::ImageToText => "image_to_text",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySession;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use visionmate_core::{AudioFormat, ExtractedText, ImagePayload, TemporaryAudio};

    // -- fakes ---------------------------------------------------------------

    #[derive(Default)]
    struct ScriptedDescriber {
        replies: Mutex<VecDeque<Result<String, VisionError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedDescriber {
        fn new(replies: Vec<Result<String, VisionError>>) -> Arc<Self> {
            Arc::new(Self { replies: Mutex::new(replies.into()), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl SceneDescriber for ScriptedDescriber {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn describe(&self, instruction: &str, image: &ImagePayload) -> Result<String, VisionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(instruction, "describe it");
            assert!(image.mime_type == "image/png" || image.mime_type == "image/jpeg");
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(VisionError::Inference("script exhausted".into())))
        }
    }

    enum OcrReply {
        Text(&'static str),
        EngineMissing,
        Corrupt,
    }

    struct FixedExtractor {
        reply: OcrReply,
        calls: AtomicUsize,
    }

    impl FixedExtractor {
        fn new(reply: OcrReply) -> Arc<Self> {
            Arc::new(Self { reply, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl TextExtractor for FixedExtractor {
        async fn extract_text(&self, _image_bytes: &[u8]) -> Result<ExtractedText, VisionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                OcrReply::Text(text) => Ok(ExtractedText::new(text)),
                OcrReply::EngineMissing => Err(VisionError::EngineUnavailable("tesseract: not found".into())),
                OcrReply::Corrupt => Err(VisionError::Extraction("bad png".into())),
            }
        }
    }

    struct CountingSynthesizer {
        fail: bool,
        calls: AtomicUsize,
        paths: Mutex<Vec<PathBuf>>,
    }

    impl CountingSynthesizer {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self { fail, calls: AtomicUsize::new(0), paths: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for CountingSynthesizer {
        async fn synthesize(&self, text: &str) -> Result<TemporaryAudio, VisionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(VisionError::Synthesis("tts offline".into()));
            }
            let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
            file.write_all(b"ID3").unwrap();
            let path = file.into_temp_path();
            self.paths.lock().unwrap().push(path.to_path_buf());
            Ok(TemporaryAudio::new(path, AudioFormat::Mp3, text))
        }
    }

    #[derive(Debug, PartialEq)]
    enum Shown {
        Image(String),
        Text { title: String, body: String },
        Warning(String),
        Error(String),
        Played { existed: bool, source_text: String },
    }

    #[derive(Default)]
    struct RecordingPresenter {
        shown: Vec<Shown>,
        fail_playback: bool,
    }

    #[async_trait]
    impl Presenter for RecordingPresenter {
        fn show_image(&mut self, image: &UploadedImage) {
            self.shown.push(Shown::Image(image.name.clone()));
        }

        fn show_text(&mut self, title: &str, body: &str) {
            self.shown.push(Shown::Text { title: title.into(), body: body.into() });
        }

        fn show_warning(&mut self, message: &str) {
            self.shown.push(Shown::Warning(message.into()));
        }

        fn show_error(&mut self, message: &str) {
            self.shown.push(Shown::Error(message.into()));
        }

        async fn play_audio(&mut self, audio: &TemporaryAudio) -> Result<(), VisionError> {
            self.shown.push(Shown::Played {
                existed: audio.path().exists(),
                source_text: audio.source_text().into(),
            });
            if self.fail_playback {
                return Err(VisionError::Playback("no audio device".into()));
            }
            Ok(())
        }
    }

    struct Harness {
        orchestrator: Orchestrator,
        describer: Arc<ScriptedDescriber>,
        extractor: Arc<FixedExtractor>,
        synthesizer: Arc<CountingSynthesizer>,
        session: InMemorySession,
        presenter: RecordingPresenter,
    }

    fn harness(
        describer: Arc<ScriptedDescriber>,
        extractor: Arc<FixedExtractor>,
        synthesizer: Arc<CountingSynthesizer>,
    ) -> Harness {
        let orchestrator = Orchestrator::new(
            describer.clone(),
            extractor.clone(),
            synthesizer.clone(),
            "describe it",
        );
        Harness {
            orchestrator,
            describer,
            extractor,
            synthesizer,
            session: InMemorySession::with_id("test-session"),
            presenter: RecordingPresenter::default(),
        }
    }

    fn default_harness(replies: Vec<Result<String, VisionError>>) -> Harness {
        harness(
            ScriptedDescriber::new(replies),
            FixedExtractor::new(OcrReply::Text("HELLO")),
            CountingSynthesizer::new(false),
        )
    }

    fn png(name: &str) -> UploadedImage {
        UploadedImage::new(name, "image/png", b"\x89PNG\r\n\x1a\nrest".to_vec())
    }

    impl Harness {
        fn upload(&mut self, image: UploadedImage) {
            self.orchestrator.upload(&mut self.session, &mut self.presenter, Some(image));
        }

        async fn run(&mut self, mode: FeatureMode) -> ActionOutcome {
            self.orchestrator.select_mode(&mut self.session, mode);
            self.orchestrator.run(&mut self.session, &mut self.presenter).await
        }
    }

    // -- describe ------------------------------------------------------------

    #[tokio::test]
    async fn describe_without_image_warns_and_skips_adapter() {
        let mut h = default_harness(vec![Ok("unused".into())]);
        let outcome = h.run(FeatureMode::DescribeScene).await;
        assert_eq!(outcome, ActionOutcome::Warned);
        assert_eq!(h.describer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.presenter.shown, vec![Shown::Warning(NEED_IMAGE.into())]);
        assert_eq!(h.session.mode(), FeatureMode::DescribeScene);
    }

    #[tokio::test]
    async fn describe_stores_and_displays_description() {
        let mut h = default_harness(vec![Ok("A busy market street.".into())]);
        let image = png("market.png");
        let image_id = image.id;
        h.upload(image);

        assert_eq!(h.run(FeatureMode::DescribeScene).await, ActionOutcome::Completed);
        let stored = h.session.description().unwrap();
        assert_eq!(stored.text, "A busy market street.");
        assert_eq!(stored.source_image, image_id);
        assert!(h.presenter.shown.contains(&Shown::Text {
            title: "Scene Description".into(),
            body: "A busy market street.".into(),
        }));
    }

    #[tokio::test]
    async fn second_description_replaces_first() {
        let mut h = default_harness(vec![Ok("first scene".into()), Ok("second scene".into())]);
        h.upload(png("one.png"));
        h.run(FeatureMode::DescribeScene).await;
        let second = png("two.png");
        let second_id = second.id;
        h.upload(second);
        h.run(FeatureMode::DescribeScene).await;

        let stored = h.session.description().unwrap();
        assert_eq!(stored.text, "second scene");
        assert_eq!(stored.source_image, second_id);
    }

    #[tokio::test]
    async fn inference_fault_leaves_description_unchanged() {
        let mut h = default_harness(vec![
            Ok("kept".into()),
            Err(VisionError::Inference("connection reset".into())),
        ]);
        h.upload(png("a.png"));
        h.run(FeatureMode::DescribeScene).await;
        let before = h.session.description().cloned();

        h.upload(png("b.png"));
        let outcome = h.run(FeatureMode::DescribeScene).await;
        assert_eq!(outcome, ActionOutcome::Failed);
        assert_eq!(h.session.description().cloned(), before);
        assert!(matches!(h.presenter.shown.last(), Some(Shown::Error(m)) if m.contains("connection reset")));
    }

    #[tokio::test]
    async fn credentials_in_failures_are_masked() {
        let mut h = default_harness(vec![Err(VisionError::Inference(
            "403 from https://host/v1/models/m:generateContent?key=AIzaSyA1234567890abcdefghijk".into(),
        ))]);
        h.upload(png("a.png"));
        assert_eq!(h.run(FeatureMode::DescribeScene).await, ActionOutcome::Failed);
        let Some(Shown::Error(message)) = h.presenter.shown.last() else {
            panic!("expected an error, got {:?}", h.presenter.shown);
        };
        assert!(message.starts_with("Error: 403"));
        assert!(!message.contains("AIzaSyA1234567890"), "{message}");
    }

    #[tokio::test]
    async fn unsupported_upload_is_error_without_adapter_call() {
        let mut h = default_harness(vec![Ok("unused".into())]);
        h.upload(UploadedImage::new("anim.gif", "image/gif", b"GIF89a".to_vec()));
        assert_eq!(h.run(FeatureMode::DescribeScene).await, ActionOutcome::Failed);
        assert_eq!(h.describer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_upload_is_warning() {
        let mut h = default_harness(vec![]);
        h.upload(UploadedImage::new("blank.png", "image/png", Vec::new()));
        assert_eq!(h.run(FeatureMode::ImageToText).await, ActionOutcome::Warned);
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    }

    // -- speech --------------------------------------------------------------

    #[tokio::test]
    async fn speech_without_description_warns_and_never_synthesizes() {
        let mut h = default_harness(vec![]);
        h.upload(png("a.png"));
        let outcome = h.run(FeatureMode::TextToSpeech).await;
        assert_eq!(outcome, ActionOutcome::Warned);
        assert_eq!(h.synthesizer.calls.load(Ordering::SeqCst), 0);
        assert!(h.presenter.shown.contains(&Shown::Warning(NEED_DESCRIPTION.into())));
    }

    #[tokio::test]
    async fn speech_plays_description_then_deletes_file() {
        let mut h = default_harness(vec![Ok("A quiet beach.".into())]);
        h.upload(png("beach.png"));
        h.run(FeatureMode::DescribeScene).await;

        assert_eq!(h.run(FeatureMode::TextToSpeech).await, ActionOutcome::Completed);
        assert!(h.presenter.shown.contains(&Shown::Played {
            existed: true,
            source_text: "A quiet beach.".into(),
        }));
        let paths = h.synthesizer.paths.lock().unwrap();
        assert_eq!(paths.len(), 1);
        assert!(std::fs::read(&paths[0]).is_err());
    }

    #[tokio::test]
    async fn playback_failure_still_deletes_file() {
        let mut h = default_harness(vec![Ok("A quiet beach.".into())]);
        h.presenter.fail_playback = true;
        h.upload(png("beach.png"));
        h.run(FeatureMode::DescribeScene).await;

        assert_eq!(h.run(FeatureMode::TextToSpeech).await, ActionOutcome::Failed);
        let paths = h.synthesizer.paths.lock().unwrap();
        assert!(!paths[0].exists());
        assert!(matches!(h.presenter.shown.last(), Some(Shown::Error(m)) if m.contains("no audio device")));
    }

    #[tokio::test]
    async fn synthesis_failure_is_reported_and_keeps_description() {
        let mut h = harness(
            ScriptedDescriber::new(vec![Ok("A lake.".into())]),
            FixedExtractor::new(OcrReply::Text("")),
            CountingSynthesizer::new(true),
        );
        h.upload(png("lake.png"));
        h.run(FeatureMode::DescribeScene).await;

        assert_eq!(h.run(FeatureMode::TextToSpeech).await, ActionOutcome::Failed);
        assert_eq!(h.session.description().unwrap().text, "A lake.");
        assert!(matches!(h.presenter.shown.last(), Some(Shown::Error(m)) if m.starts_with("Error:")));
    }

    // -- OCR -----------------------------------------------------------------

    #[tokio::test]
    async fn ocr_displays_text_without_persisting() {
        let mut h = default_harness(vec![]);
        h.upload(png("note.png"));
        assert_eq!(h.run(FeatureMode::ImageToText).await, ActionOutcome::Completed);
        assert!(h.presenter.shown.contains(&Shown::Text {
            title: "Extracted Text".into(),
            body: "HELLO".into(),
        }));
        assert!(h.session.description().is_none());
    }

    #[tokio::test]
    async fn ocr_empty_result_is_success() {
        let mut h = harness(
            ScriptedDescriber::new(vec![]),
            FixedExtractor::new(OcrReply::Text("")),
            CountingSynthesizer::new(false),
        );
        h.upload(png("blank.png"));
        assert_eq!(h.run(FeatureMode::ImageToText).await, ActionOutcome::Completed);
        assert!(h.presenter.shown.contains(&Shown::Text {
            title: "Extracted Text".into(),
            body: String::new(),
        }));
    }

    #[tokio::test]
    async fn ocr_engine_missing_and_generic_failures_differ() {
        let mut missing = harness(
            ScriptedDescriber::new(vec![]),
            FixedExtractor::new(OcrReply::EngineMissing),
            CountingSynthesizer::new(false),
        );
        missing.upload(png("a.png"));
        missing.run(FeatureMode::ImageToText).await;

        let mut corrupt = harness(
            ScriptedDescriber::new(vec![]),
            FixedExtractor::new(OcrReply::Corrupt),
            CountingSynthesizer::new(false),
        );
        corrupt.upload(png("a.png"));
        corrupt.run(FeatureMode::ImageToText).await;

        let Some(Shown::Error(missing_msg)) = missing.presenter.shown.last() else {
            panic!("expected error");
        };
        let Some(Shown::Error(corrupt_msg)) = corrupt.presenter.shown.last() else {
            panic!("expected error");
        };
        assert!(missing_msg.contains("Tesseract is not installed"));
        assert!(corrupt_msg.contains("bad png"));
        assert_ne!(missing_msg, corrupt_msg);
    }

    #[tokio::test]
    async fn ocr_without_image_warns() {
        let mut h = default_harness(vec![]);
        assert_eq!(h.run(FeatureMode::ImageToText).await, ActionOutcome::Warned);
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    }

    // -- upload / mode ---------------------------------------------------------

    #[tokio::test]
    async fn clearing_upload_blocks_image_actions() {
        let mut h = default_harness(vec![]);
        h.upload(png("a.png"));
        h.orchestrator.upload(&mut h.session, &mut h.presenter, None);
        assert!(h.session.image().is_none());
        assert_eq!(h.run(FeatureMode::ImageToText).await, ActionOutcome::Warned);
    }

    #[test]
    fn upload_shows_image_and_mode_change_runs_nothing() {
        let mut h = default_harness(vec![]);
        h.upload(png("shown.png"));
        h.orchestrator.select_mode(&mut h.session, FeatureMode::TextToSpeech);
        assert_eq!(h.presenter.shown, vec![Shown::Image("shown.png".into())]);
        assert_eq!(h.session.mode(), FeatureMode::TextToSpeech);
        assert_eq!(h.synthesizer.calls.load(Ordering::SeqCst), 0);
    }
}
