//! Environment handling for config values.
//!
//! - `${VAR_NAME}` in any string value is replaced at load time; names are
//!   uppercase `[A-Z_][A-Z0-9_]*`. `$${VAR}` produces a literal `${VAR}`.
//! - Well-known variables fill credentials and paths the file leaves unset.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::schema::{SpeechProviderKind, VisionMateConfig, VisionProviderKind};

/// Matches both `$${VAR}` (escaped, group 1 is `$`) and `${VAR}`.
static ENV_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references using the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references using the given map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute(value, env, "")
}

fn substitute(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    Ok(match value {
        Value::String(s) => Value::String(substitute_str(s, env, path)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| substitute(v, env, &format!("{path}[{i}]")))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                out.insert(k.clone(), substitute(v, env, &child)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

fn substitute_str(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }
    let mut missing = None;
    let out = ENV_REF.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });
    if let Some(var_name) = missing {
        bail!(MissingEnvVarError { var_name, config_path: path.to_string() });
    }
    Ok(out.into_owned())
}

/// Fill unset credentials and paths from well-known variables.
///
/// Values present in the file always win.
pub fn apply_env_overrides(mut config: VisionMateConfig, env: &HashMap<String, String>) -> VisionMateConfig {
    let get = |name: &str| env.get(name).filter(|v| !v.trim().is_empty()).cloned();

    if config.vision.api_key.is_none() {
        config.vision.api_key = match config.vision.provider {
            VisionProviderKind::Gemini => get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
            VisionProviderKind::OpenAi => get("OPENAI_API_KEY"),
        };
    }
    if config.speech.provider == SpeechProviderKind::OpenAi && config.speech.api_key.is_none() {
        config.speech.api_key = get("OPENAI_API_KEY");
    }
    if config.ocr.tesseract_path.is_none() {
        config.ocr.tesseract_path = get("TESSERACT_CMD").map(PathBuf::from);
    }
    if config.logging.level.is_none() {
        config.logging.level = get("VISIONMATE_LOG");
    }
    config
}
