pub mod ocr;
pub mod vision;

pub use ocr::{clean_ocr_output, ImageTextExtractor, OcrEngine, TesseractEngine};
pub use vision::{
    create_describer, GeminiDescriber, OpenAiDescriber, VisionProvider, DEFAULT_GEMINI_MODEL,
    DEFAULT_OPENAI_MODEL, DEFAULT_SCENE_INSTRUCTION,
};
