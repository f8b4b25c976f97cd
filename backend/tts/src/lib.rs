pub mod chunk;
pub mod engine;
pub mod synth;

pub use chunk::split_for_tts;
pub use engine::{
    create_tts, GoogleTranslateTts, OpenAiTts, TtsProvider, TtsProviderKind, TtsRequest,
    GOOGLE_TTS_MAX_CHARS,
};
pub use synth::AudioFileSynthesizer;
