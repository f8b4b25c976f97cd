//! Config file location and loading.

use crate::schema::VisionMateConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the VisionMate config directory.
/// Priority: `VISIONMATE_CONFIG_DIR` env > `~/.visionmate/` > `./.visionmate`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("VISIONMATE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".visionmate"))
        .unwrap_or_else(|| PathBuf::from(".visionmate"))
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the YAML file as an untyped tree.
///
/// A missing file yields an empty mapping so env vars alone can configure a run.
pub async fn load_config_value(path: &Path) -> Result<serde_json::Value> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(serde_json::Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: serde_json::Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    // An empty file parses as null.
    Ok(if value.is_null() { serde_json::Value::Object(Default::default()) } else { value })
}

/// Fill API keys from their `apiKeyFile` when no inline key is set.
pub async fn resolve_key_files(mut config: VisionMateConfig) -> Result<VisionMateConfig> {
    if config.vision.api_key.is_none() {
        if let Some(file) = &config.vision.api_key_file {
            let key = fs::read_to_string(file)
                .await
                .with_context(|| format!("Failed to read vision.apiKeyFile: {}", file.display()))?;
            config.vision.api_key = Some(key.trim().to_string());
        }
    }
    Ok(config)
}
