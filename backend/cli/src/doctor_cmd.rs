//! CLI Doctor Command
//!
//! Checks configuration, the OCR engine, and the audio player before a
//! user hits them mid-session.

use std::path::{Path, PathBuf};

use anyhow::Result;
use visionmate_config::{load_effective, validate, VisionMateConfig};

use crate::runtime::tesseract_engine;
use crate::terminal_output::{note_error, note_success, render_table, GREEN, RED, RESET, YELLOW};

#[derive(Debug, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
}

struct Check {
    name: &'static str,
    status: Status,
    detail: String,
}

/// Executes the full doctor diagnosis. Returns whether every check passed.
pub async fn run(config_path: &Path) -> Result<bool> {
    println!("\nRunning VisionMate Doctor...\n");

    let (config, mut checks) = check_config(config_path).await;
    checks.push(check_tesseract(&config).await);
    checks.push(check_player(&config));

    let rows: Vec<(String, String)> = checks
        .iter()
        .map(|c| (c.name.to_string(), format!("{} {}", badge(&c.status), c.detail)))
        .collect();
    print!("{}", render_table(["Check", "Result"], &rows));
    println!();

    let healthy = checks.iter().all(|c| c.status != Status::Fail);
    if healthy {
        note_success("All checks passed! VisionMate is ready.");
    } else {
        note_error("Some checks failed! Please fix the errors above.");
    }
    Ok(healthy)
}

fn badge(status: &Status) -> String {
    match status {
        Status::Ok => format!("{GREEN}ok{RESET}"),
        Status::Warn => format!("{YELLOW}warn{RESET}"),
        Status::Fail => format!("{RED}FAIL{RESET}"),
    }
}

async fn check_config(path: &Path) -> (VisionMateConfig, Vec<Check>) {
    let config = match load_effective(path).await {
        Ok(config) => config,
        Err(e) => {
            let check = Check { name: "config", status: Status::Fail, detail: format!("{e:#}") };
            let fallback = visionmate_config::apply_all_defaults(VisionMateConfig::default());
            return (fallback, vec![check]);
        }
    };

    let report = validate(&config);
    let mut checks = Vec::new();
    if report.is_valid() {
        checks.push(Check {
            name: "config",
            status: Status::Ok,
            detail: format!("{} loaded", path.display()),
        });
    }
    for error in &report.errors {
        checks.push(Check { name: "config", status: Status::Fail, detail: error.to_string() });
    }
    for warning in &report.warnings {
        checks.push(Check { name: "config", status: Status::Warn, detail: warning.to_string() });
    }
    (config, checks)
}

async fn check_tesseract(config: &VisionMateConfig) -> Check {
    match tesseract_engine(config).version().await {
        Ok(version) => Check { name: "tesseract", status: Status::Ok, detail: version },
        Err(e) => Check { name: "tesseract", status: Status::Fail, detail: e.user_message() },
    }
}

fn check_player(config: &VisionMateConfig) -> Check {
    let Some(program) = config
        .player
        .command
        .as_deref()
        .and_then(|c| c.split_whitespace().next())
    else {
        return Check {
            name: "player",
            status: Status::Warn,
            detail: "no audio player configured; speech output will fail".into(),
        };
    };
    match find_program(program) {
        Some(path) => Check { name: "player", status: Status::Ok, detail: path.display().to_string() },
        None => Check {
            name: "player",
            status: Status::Warn,
            detail: format!("`{program}` not found on PATH"),
        },
    }
}

/// Locate an executable by explicit path or by searching `PATH`.
fn find_program(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_path_is_not_found() {
        assert!(find_program("/no/such/dir/player").is_none());
    }

    #[test]
    fn unconfigured_player_warns() {
        let config = VisionMateConfig::default();
        let check = check_player(&config);
        assert_eq!(check.status, Status::Warn);
    }

    #[tokio::test]
    async fn missing_credential_fails_config_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "vision:\n  provider: openai\n  apiKey: \"\"\n").unwrap();
        let (_, checks) = check_config(&path).await;
        assert!(checks.iter().any(|c| c.status == Status::Fail));
    }
}
