use super::AudioPlayer;
use crate::audio::wav_duration;
use crate::config::PlaybackConfig;
use crate::error::CollaboratorError;
use std::path::Path;
use tokio::process::Command;
use tracing::info;

/// Plays files through a command line player (`aplay`, `afplay`, `paplay`, ...)
pub struct CommandPlayer {
    command: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

#[async_trait::async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, path: &Path) -> Result<(), CollaboratorError> {
        if !path.exists() {
            return Err(CollaboratorError::Playback(format!(
                "audio file missing: {}",
                path.display()
            )));
        }

        info!("Playing {} ({:.1}s)", path.display(), wav_duration(path));

        let status = Command::new(&self.command)
            .args(&self.args)
            .arg(path)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                CollaboratorError::Playback(format!("failed to start {}: {}", self.command, e))
            })?;

        if !status.success() {
            return Err(CollaboratorError::Playback(format!(
                "{} exited with {}",
                self.command, status
            )));
        }

        Ok(())
    }
}
