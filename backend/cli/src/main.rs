mod config_cmd;
mod doctor_cmd;
mod interactive;
mod presenter;
mod runtime;
mod terminal_output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use visionmate_assistant::{ActionOutcome, InMemorySession, Orchestrator};
use visionmate_config::{config_dir, config_file_path, load_and_prepare, VisionMateConfig};
use visionmate_core::FeatureMode;

use presenter::TerminalPresenter;
use terminal_output::note_error;

#[derive(Parser)]
#[command(name = "visionmate")]
#[command(about = "VisionMate: scene descriptions, read-aloud and OCR for images")]
#[command(version)]
struct Cli {
    /// Path to config.yaml (default: ~/.visionmate/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe the scene in an image
    Describe { image: PathBuf },
    /// Describe an image and read the description aloud
    Speak { image: PathBuf },
    /// Extract printed text from an image
    Ocr { image: PathBuf },
    /// Start a line-oriented session
    Interactive,
    /// Check configuration, OCR engine and audio player
    Doctor,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration with secrets masked
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            note_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but its action did not complete.
async fn dispatch(cli: Cli) -> Result<bool> {
    let config_path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));

    match cli.command {
        Commands::Doctor => {
            visionmate_logging::init_logger(None, "warn");
            doctor_cmd::run(&config_path).await
        }
        Commands::Config { action: ConfigAction::Show } => {
            visionmate_logging::init_logger(None, "warn");
            config_cmd::show(&config_path).await?;
            Ok(true)
        }
        Commands::Describe { image } => {
            one_shot(&config_path, &image, &[FeatureMode::DescribeScene]).await
        }
        Commands::Speak { image } => {
            let steps = [FeatureMode::DescribeScene, FeatureMode::TextToSpeech];
            one_shot(&config_path, &image, &steps).await
        }
        Commands::Ocr { image } => {
            one_shot(&config_path, &image, &[FeatureMode::ImageToText]).await
        }
        Commands::Interactive => {
            let (config, orchestrator) = start(&config_path).await?;
            let mut presenter = TerminalPresenter::new(config.player.command.clone());
            interactive::run(&orchestrator, &mut presenter).await?;
            Ok(true)
        }
    }
}

/// Load and validate config, install logging, and wire the adapters.
async fn start(config_path: &Path) -> Result<(VisionMateConfig, Orchestrator)> {
    let config = load_and_prepare(config_path).await?;
    visionmate_logging::init_logger(
        config.logging.dir.as_deref(),
        config.logging.level.as_deref().unwrap_or("info"),
    );
    info!(config = %config_path.display(), "Starting VisionMate");
    let orchestrator = runtime::build_orchestrator(&config)?;
    Ok((config, orchestrator))
}

/// Upload one image and run each mode in order, stopping at the first
/// action that does not complete.
async fn one_shot(config_path: &Path, image: &Path, steps: &[FeatureMode]) -> Result<bool> {
    let (config, orchestrator) = start(config_path).await?;
    let mut presenter = TerminalPresenter::new(config.player.command.clone());
    let mut session = InMemorySession::new();

    let upload = runtime::read_upload(image).await?;
    orchestrator.upload(&mut session, &mut presenter, Some(upload));

    for &mode in steps {
        orchestrator.select_mode(&mut session, mode);
        if orchestrator.run(&mut session, &mut presenter).await != ActionOutcome::Completed {
            return Ok(false);
        }
    }
    Ok(true)
}
