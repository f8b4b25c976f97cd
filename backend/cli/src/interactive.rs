//! Line-oriented interactive session.
//!
//! One command per line; each action finishes before the next line is read.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use visionmate_assistant::{InMemorySession, Orchestrator, Presenter, SessionStore};
use visionmate_core::FeatureMode;

use crate::runtime::read_upload;
use crate::terminal_output::{note_error, note_info};

const HELP: &str = "\
Commands:
  upload <path>                 load an image (replaces the current one)
  clear                         forget the current image
  mode <describe|speak|ocr>     choose the feature to run
  run                           run the selected feature
  status                        show session state
  help                          show this help
  quit                          leave the session";

#[derive(Debug, PartialEq)]
enum ReplCommand {
    Upload(PathBuf),
    Clear,
    Mode(FeatureMode),
    Run,
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
fn parse_line(text: &str) -> Result<Option<ReplCommand>, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((trimmed, ""));

    let command = match word.to_ascii_lowercase().as_str() {
        "upload" | "open" => {
            if rest.is_empty() {
                return Err("usage: upload <path>".into());
            }
            ReplCommand::Upload(PathBuf::from(rest))
        }
        "clear" => ReplCommand::Clear,
        "mode" => ReplCommand::Mode(rest.parse::<FeatureMode>()?),
        "run" | "go" => ReplCommand::Run,
        "status" => ReplCommand::Status,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command: {other} (type `help`)")),
    };
    Ok(Some(command))
}

fn print_status(session: &dyn SessionStore) {
    let image = session
        .image()
        .map(|i| format!("{} ({} bytes)", i.name, i.len()))
        .unwrap_or_else(|| "none".into());
    let description = session
        .description()
        .map(|d| format!("{} chars", d.text.chars().count()))
        .unwrap_or_else(|| "none".into());
    println!("  mode:        {}", session.mode());
    println!("  image:       {image}");
    println!("  description: {description}");
}

pub async fn run(orchestrator: &Orchestrator, presenter: &mut dyn Presenter) -> Result<()> {
    let mut session = InMemorySession::new();
    info!(session_id = %session.id(), "Interactive session started");
    note_info("VisionMate interactive session. Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("[{}] > ", session.mode());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                note_error(&message);
                continue;
            }
        };

        match command {
            ReplCommand::Upload(path) => match read_upload(&path).await {
                Ok(image) => orchestrator.upload(&mut session, presenter, Some(image)),
                Err(e) => note_error(&format!("{e:#}")),
            },
            ReplCommand::Clear => orchestrator.upload(&mut session, presenter, None),
            ReplCommand::Mode(mode) => {
                orchestrator.select_mode(&mut session, mode);
                note_info(&format!("Mode: {mode}"));
            }
            ReplCommand::Run => {
                orchestrator.run(&mut session, presenter).await;
            }
            ReplCommand::Status => print_status(&session),
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Quit => break,
        }
    }

    info!(session_id = %session.id(), "Interactive session ended");
    Ok(())
}
