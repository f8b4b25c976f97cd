//! `visionmate config show`: print the effective configuration with secrets masked.

use std::path::Path;

use anyhow::{Context, Result};
use visionmate_config::{load_effective, redact, validate, VisionMateConfig};

use crate::terminal_output::{note_error, note_info, note_warn};

pub async fn show(path: &Path) -> Result<()> {
    let config = load_effective(path).await?;
    note_info(&format!("Config file: {}", path.display()));
    println!("{}", render_redacted(&config)?);

    let report = validate(&config);
    for warning in &report.warnings {
        note_warn(&warning.to_string());
    }
    for error in &report.errors {
        note_error(&error.to_string());
    }
    Ok(())
}

fn render_redacted(config: &VisionMateConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    serde_json::to_string_pretty(&redact(&value)).context("Failed to render config")
}
