//! `visionmate-config`: VisionMate runtime configuration.
//!
//! Provides:
//! - Typed config schema (vision, speech, OCR, network, player, logging)
//! - YAML loading with `${ENV_VAR}` substitution and well-known env fallbacks
//! - Default value application
//! - Validation that refuses to start without credentials
//! - Config redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use schema::{
    IntakeConfig, LoggingConfig, NetworkConfig, OcrConfig, PlayerConfig, SpeechConfig,
    SpeechProviderKind, VisionConfig, VisionMateConfig, VisionProviderKind,
};
pub use io::{config_dir, config_file_path, load_config_value, resolve_key_files};
pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use redact::redact;
pub use defaults::apply_all_defaults;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply defaults, and validate a config file.
///
/// This is the main entry point at process start. Any validation error
/// aborts: the process must not start half-configured.
pub async fn load_and_prepare(path: &Path) -> Result<VisionMateConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_and_prepare_with(path, &env).await
}

/// Effective config against the process environment, for display and diagnostics.
pub async fn load_effective(path: &Path) -> Result<VisionMateConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_effective_with(path, &env).await
}

/// Build the effective config (file, env, key files, defaults) without validating it.
pub async fn load_effective_with(path: &Path, env: &HashMap<String, String>) -> Result<VisionMateConfig> {
    let value = load_config_value(path).await?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: VisionMateConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    // A key file named in the config outranks environment credentials.
    let config = resolve_key_files(config).await?;
    let config = apply_env_overrides(config, env);
    Ok(apply_all_defaults(config))
}

/// [`load_and_prepare`] against an explicit environment.
pub async fn load_and_prepare_with(path: &Path, env: &HashMap<String, String>) -> Result<VisionMateConfig> {
    let config = load_effective_with(path, env).await?;

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        let summary: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", summary.join("\n  "));
    }

    Ok(config)
}
