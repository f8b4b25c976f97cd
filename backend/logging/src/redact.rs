//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens and key query parameters from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_\-]{20,})|(AIza[0-9A-Za-z_\-]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
static KEY_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&]key=)[^&\s]+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    KEY_PARAM_RE
        .replace_all(&redacted, "${1}[REDACTED_TOKEN]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_tokens() {
        let raw = "auth Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 with AIzaSyA1234567890abcdefghijk";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGci"));
        assert!(!clean.contains("AIzaSyA1234567890"));
    }

    #[test]
    fn redacts_key_query_param() {
        let clean = redact_sensitive_data("POST https://host/v1/models/m:generateContent?key=abc123&alt=json");
        assert!(clean.contains("?key=[REDACTED_TOKEN]&alt=json"));
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(redact_sensitive_data("A red bicycle leans on a wall."), "A red bicycle leans on a wall.");
    }
}
