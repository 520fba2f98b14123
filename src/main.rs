use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use voice_companion::{
    AudioLifecycleManager, CharacterProfile, ClaudeClient, Collaborators, CommandPlayer, Config,
    ConversationMemory, SessionOrchestrator, SessionSettings, ShutdownSignal, SovitsClient,
    Termination, WhisperTranscriber,
};

#[derive(Debug, Parser)]
#[command(name = "voice-companion", version, about = "Turn-based voice companion")]
struct Cli {
    /// Config file, with or without extension
    #[arg(short, long, default_value = "config/voice-companion")]
    config: String,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(log_file: &Path, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env: {}", e);
        }
    }

    let cfg = Config::load(&cli.config)?;
    init_logging(&cfg.paths.log_file, cli.verbose)?;

    info!("Voice Companion v{}", env!("CARGO_PKG_VERSION"));
    cfg.ensure_directories()?;

    let api_key = cfg.api_key()?;

    let profile = CharacterProfile::load_or_create(&cfg.paths.character_file, &cfg.paths.character_dir);
    info!("Character loaded: {}", profile.name);

    let memory = ConversationMemory::open(&cfg.paths.history_file);
    info!("History: {} previous exchanges", memory.history_len());

    let collaborators = Collaborators {
        transcriber: Box::new(WhisperTranscriber::new(&cfg.asr)?),
        llm: Box::new(ClaudeClient::new(&cfg.llm, api_key)?),
        synthesizer: Box::new(SovitsClient::new(&cfg.tts)?),
        player: Box::new(CommandPlayer::new(&cfg.playback)),
    };
    info!("Speech recognition via {} ({})", cfg.asr.base_url, cfg.asr.model);

    let shutdown = ShutdownSignal::new();
    let signal_task = shutdown.listen_for_ctrl_c();

    let mut orchestrator = SessionOrchestrator::new(
        SessionSettings::from_config(&cfg),
        profile,
        memory,
        AudioLifecycleManager::new(&cfg.paths.audio_dir),
        collaborators,
        shutdown,
    );

    let termination = orchestrator.run().await;
    signal_task.abort();

    match termination {
        Termination::Farewell => info!("Goodbye"),
        Termination::Interrupted => info!("Stopped by interrupt"),
        Termination::Fatal(reason) => {
            warn!("Session ended after a fatal error");
            anyhow::bail!(reason);
        }
    }

    Ok(())
}
