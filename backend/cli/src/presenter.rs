//! Terminal presenter: prints results and plays audio through an external player.

use std::io;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use visionmate_assistant::Presenter;
use visionmate_core::{TemporaryAudio, UploadedImage, VisionError};

use crate::terminal_output::{note_error, note_info, note_warn, render_section, supports_color};

const EMPTY_TEXT: &str = "(no text found)";

pub struct TerminalPresenter {
    player: Option<String>,
    color: bool,
}

impl TerminalPresenter {
    pub fn new(player: Option<String>) -> Self {
        Self { player, color: supports_color() }
    }
}

#[async_trait]
impl Presenter for TerminalPresenter {
    fn show_image(&mut self, image: &UploadedImage) {
        let kind = if image.media_type.is_empty() { "unknown type" } else { image.media_type.as_str() };
        note_info(&format!("Uploaded image: {} ({} bytes, {kind})", image.name, image.len()));
    }

    fn show_text(&mut self, title: &str, body: &str) {
        let body = if body.is_empty() { EMPTY_TEXT } else { body };
        print!("{}", render_section(title, body, self.color));
    }

    fn show_warning(&mut self, message: &str) {
        note_warn(message);
    }

    fn show_error(&mut self, message: &str) {
        note_error(message);
    }

    async fn play_audio(&mut self, audio: &TemporaryAudio) -> Result<(), VisionError> {
        let Some(command) = self.player.as_deref() else {
            return Err(VisionError::Playback(
                "no audio player configured; set player.command".into(),
            ));
        };
        note_info(&format!("Playing audio ({})...", audio.format().mime_type()));
        play_with(command, audio.path()).await
    }
}

/// Split a player command line into program and arguments, appending the file.
pub fn player_invocation(command: &str, file: &Path) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    let mut args: Vec<String> = parts.collect();
    args.push(file.display().to_string());
    Some((program, args))
}

async fn play_with(command: &str, file: &Path) -> Result<(), VisionError> {
    let (program, args) = player_invocation(command, file)
        .ok_or_else(|| VisionError::Playback("audio player command is empty".into()))?;
    debug!(program = %program, file = %file.display(), "Starting audio player");

    let status = Command::new(&program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                VisionError::Playback(format!("audio player `{program}` was not found"))
            }
            _ => VisionError::Playback(format!("could not start `{program}`: {e}")),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(VisionError::Playback(format!("`{program}` exited with {status}")))
    }
}
