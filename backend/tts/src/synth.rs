//! Speech synthesis into a caller-owned temporary file.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempPath;
use tracing::{info, warn};
use visionmate_core::{AudioFormat, SpeechSynthesizer, TemporaryAudio, VisionError};

use crate::engine::{TtsProvider, TtsRequest};

/// Runs a `TtsProvider` and writes its output to a fresh temp file.
///
/// The file is complete and synced before the handle is returned. If anything
/// fails before that point no file is left behind.
pub struct AudioFileSynthesizer {
    provider: Arc<dyn TtsProvider>,
    language: String,
    voice: Option<String>,
    format: AudioFormat,
    speed: f32,
}

impl AudioFileSynthesizer {
    pub fn new(provider: Arc<dyn TtsProvider>, language: impl Into<String>) -> Self {
        Self {
            provider,
            language: language.into(),
            voice: None,
            format: AudioFormat::Mp3,
            speed: 1.0,
        }
    }

    pub fn with_voice(mut self, voice: Option<String>) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for AudioFileSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<TemporaryAudio, VisionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VisionError::Synthesis("No text to speak".into()));
        }

        let req = TtsRequest {
            text: text.to_string(),
            language: self.language.clone(),
            voice: self.voice.clone(),
            format: self.format,
            speed: self.speed,
        };
        let audio = self.provider.synthesize(req).await.map_err(|e| {
            warn!(provider = self.provider.name(), error = %e, "TTS provider failed");
            VisionError::Synthesis(format!("{e:#}"))
        })?;
        if audio.is_empty() {
            return Err(VisionError::Synthesis(format!(
                "{} returned no audio",
                self.provider.name()
            )));
        }

        let path = write_temp_audio(&audio, self.format)
            .map_err(|e| VisionError::Synthesis(format!("could not write audio file: {e}")))?;
        info!(
            path = %path.display(),
            bytes = audio.len(),
            mime_type = self.format.mime_type(),
            "Synthesized speech"
        );
        Ok(TemporaryAudio::new(path, self.format, text))
    }
}

fn write_temp_audio(bytes: &[u8], format: AudioFormat) -> std::io::Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("visionmate-tts-")
        .suffix(&format!(".{}", format.extension()))
        .tempfile()?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    Ok(file.into_temp_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeTts {
        reply: Option<&'static [u8]>,
        calls: AtomicUsize,
    }

    impl FakeTts {
        fn new(reply: Option<&'static [u8]>) -> Arc<Self> {
            Arc::new(Self { reply, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl TtsProvider for FakeTts {
        fn name(&self) -> &str {
            "fake"
        }

        async fn synthesize(&self, req: TtsRequest) -> anyhow::Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(req.language, "en");
            self.reply
                .map(Bytes::from_static)
                .ok_or_else(|| anyhow!("network unreachable"))
        }
    }

    #[tokio::test]
    async fn writes_complete_file_then_release_removes_it() {
        let tts = FakeTts::new(Some(b"ID3\x04audio-bytes"));
        let synth = AudioFileSynthesizer::new(tts.clone(), "en");
        let audio = synth.synthesize("A bench in a park.").await.unwrap();
        let path = audio.path().to_path_buf();

        assert_eq!(std::fs::read(&path).unwrap(), b"ID3\x04audio-bytes");
        assert_eq!(path.extension().unwrap(), "mp3");
        assert_eq!(audio.source_text(), "A bench in a park.");

        audio.release().unwrap();
        assert!(std::fs::read(&path).is_err());
    }

    #[tokio::test]
    async fn configured_format_names_the_file() {
        let synth = AudioFileSynthesizer::new(FakeTts::new(Some(b"RIFF")), "en")
            .with_format(AudioFormat::Wav);
        let audio = synth.synthesize("hello").await.unwrap();
        assert_eq!(audio.format(), AudioFormat::Wav);
        assert_eq!(audio.path().extension().unwrap(), "wav");
    }

    #[tokio::test]
    async fn blank_text_never_reaches_provider() {
        let tts = FakeTts::new(Some(b"ID3"));
        let synth = AudioFileSynthesizer::new(tts.clone(), "en");
        let err = synth.synthesize("  ").await.unwrap_err();
        assert!(matches!(err, VisionError::Synthesis(_)));
        assert_eq!(tts.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_synthesis_error() {
        let synth = AudioFileSynthesizer::new(FakeTts::new(None), "en");
        let err = synth.synthesize("hello").await.unwrap_err();
        assert!(matches!(err, VisionError::Synthesis(ref m) if m.contains("network unreachable")));
    }

    #[tokio::test]
    async fn empty_audio_is_synthesis_error() {
        let synth = AudioFileSynthesizer::new(FakeTts::new(Some(b"")), "en");
        assert!(matches!(synth.synthesize("hello").await, Err(VisionError::Synthesis(_))));
    }
}
