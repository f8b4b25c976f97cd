//! Session Event Logger
//!
//! One structured event per orchestrator step, emitted under the
//! `session_events` target with free text redacted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    ImageUploaded {
        name: String,
        media_type: String,
        bytes: usize,
    },
    ImageCleared,
    ModeSelected {
        mode: String,
    },
    ActionStarted {
        mode: String,
    },
    ActionCompleted {
        mode: String,
        output_chars: usize,
    },
    ActionWarned {
        mode: String,
        message: String,
    },
    ActionFailed {
        mode: String,
        error_msg: String,
    },
    AudioReleased {
        ok: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: SessionEvent,
}

impl EventLogEntry {
    pub fn new(session_id: &str, mut event: SessionEvent) -> Self {
        match &mut event {
            SessionEvent::ActionWarned { message, .. } => {
                *message = redact_sensitive_data(message);
            }
            SessionEvent::ActionFailed { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            _ => {}
        }
        Self {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Redact and emit a session event.
    pub fn log_event(session_id: &str, event: SessionEvent) {
        let entry = EventLogEntry::new(session_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "session_events", session_id = %entry.session_id, event = %json, "Session event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_are_redacted() {
        let entry = EventLogEntry::new(
            "s1",
            SessionEvent::ActionFailed {
                mode: "describe_scene".into(),
                error_msg: "401 for Bearer abcdefghijklmnop".into(),
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "action_failed");
        assert!(!json["event"]["error_msg"].as_str().unwrap().contains("abcdefghijklmnop"));
    }
}
