//! Structured logging for VisionMate.
//!
//! Handles log redaction, console and JSON file output, and session event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, SessionEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
