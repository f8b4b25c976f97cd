//! Session orchestration for VisionMate.
//!
//! Holds the per-interaction state and routes each user action to the
//! scene, OCR, or speech adapter.

pub mod orchestrator;
pub mod presenter;
pub mod session;

pub use orchestrator::{ActionOutcome, Orchestrator, NEED_DESCRIPTION, NEED_IMAGE};
pub use presenter::Presenter;
pub use session::{InMemorySession, SessionStore};
