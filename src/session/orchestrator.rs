use super::config::SessionSettings;
use super::shutdown::ShutdownSignal;
use super::state::{SessionState, Termination, TurnOutcome};
use crate::audio::{AudioLifecycleManager, AudioRole};
use crate::character::CharacterProfile;
use crate::memory::ConversationMemory;
use crate::services::Collaborators;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Phrases that end the session, compared trimmed and case-insensitively
pub const EXIT_PHRASES: [&str; 4] = ["exit", "quit", "bye", "goodbye"];

/// Spoken when an exit phrase is recognised
pub const FAREWELL_TEXT: &str = "Bye bye, senpai! See you next time~ ♡";

/// Spoken and recorded in place of a reply when the language model fails
pub const FALLBACK_REPLY: &str =
    "Ehh?! S-sorry senpai, I'm having trouble thinking right now... *blushes* Try again?";

pub fn is_exit_phrase(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    EXIT_PHRASES.contains(&normalized.as_str())
}

/// Drives the listen → respond → play → persist loop for one process lifetime
pub struct SessionOrchestrator {
    settings: SessionSettings,
    profile: CharacterProfile,
    memory: ConversationMemory,
    audio: AudioLifecycleManager,
    collaborators: Collaborators,
    shutdown: ShutdownSignal,
    state: SessionState,
    turns_started: u64,
    completed_turns: u64,
}

impl SessionOrchestrator {
    pub fn new(
        settings: SessionSettings,
        profile: CharacterProfile,
        memory: ConversationMemory,
        audio: AudioLifecycleManager,
        collaborators: Collaborators,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            settings,
            profile,
            memory,
            audio,
            collaborators,
            shutdown,
            state: SessionState::Listening,
            turns_started: 0,
            completed_turns: 0,
        }
    }

    /// Run turns until a farewell, an interrupt, or a fatal error.
    ///
    /// The final retention pass runs whichever way the loop ends.
    pub async fn run(&mut self) -> Termination {
        info!("Ready, {} is listening", self.profile.name);

        let termination = loop {
            if self.shutdown.is_triggered() {
                self.log_interrupt();
                break Termination::Interrupted;
            }

            self.turns_started += 1;
            info!("--- Conversation #{} ---", self.turns_started);

            match self.run_turn().await {
                Ok(TurnOutcome::Farewell) => break Termination::Farewell,
                Ok(TurnOutcome::Empty) | Ok(TurnOutcome::Completed { .. }) => {}
                // The recorder receives the same SIGINT and fails the turn
                Err(e) if self.shutdown.is_triggered() => {
                    debug!("Turn #{} cut short by interrupt: {:#}", self.turns_started, e);
                    self.log_interrupt();
                    break Termination::Interrupted;
                }
                Err(e) => {
                    error!(
                        "Fatal error during turn #{} in state {}: {:?}",
                        self.turns_started, self.state, e
                    );
                    break Termination::Fatal(format!("{:#}", e));
                }
            }
        };

        self.terminate();
        termination
    }

    /// Execute one turn of the state machine
    pub async fn run_turn(&mut self) -> Result<TurnOutcome> {
        self.transition(SessionState::Listening);
        let recording = self.audio.recording_path();
        info!("Listening...");

        self.transition(SessionState::Transcribing);
        let user_text = self
            .collaborators
            .transcriber
            .transcribe(&recording)
            .await
            .context("Transcription failed")?;

        if user_text.trim().is_empty() {
            self.transition(SessionState::Empty);
            warn!("No speech detected, listening again");
            return Ok(TurnOutcome::Empty);
        }

        info!("User: {}", user_text);

        if is_exit_phrase(&user_text) {
            self.transition(SessionState::Farewell);
            info!("Ending conversation");
            info!("{}: {}", self.profile.name, FAREWELL_TEXT);
            self.speak(FAREWELL_TEXT, AudioRole::Farewell).await?;
            return Ok(TurnOutcome::Farewell);
        }

        self.transition(SessionState::Responding);
        let (reply, fallback) = self.respond(&user_text).await;
        info!("{}: {}", self.profile.name, reply);

        let audio_path = self.speak(&reply, AudioRole::Reply).await?;

        self.transition(SessionState::Persisting);
        self.memory
            .add_exchange(user_text, reply.clone())
            .context("Failed to persist exchange")?;

        self.completed_turns += 1;
        if self.settings.cleanup_every > 0 && self.completed_turns % self.settings.cleanup_every == 0 {
            self.cleanup_audio(self.settings.keep_latest);
        }

        Ok(TurnOutcome::Completed {
            reply,
            audio_path,
            fallback,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn profile(&self) -> &CharacterProfile {
        &self.profile
    }

    /// Content turns that completed with a recorded exchange
    pub fn completed_turns(&self) -> u64 {
        self.completed_turns
    }

    /// Query the language model, substituting the fallback reply on failure
    async fn respond(&self, user_text: &str) -> (String, bool) {
        let context = self.memory.get_recent_context(self.settings.context_turns);

        info!("Thinking...");
        match self
            .collaborators
            .llm
            .complete(&self.profile.system_prompt, &context, user_text)
            .await
        {
            Ok(reply) => (reply, false),
            Err(e) => {
                warn!("Language model query failed, using fallback reply: {}", e);
                (FALLBACK_REPLY.to_string(), true)
            }
        }
    }

    /// Synthesize `text` to a fresh file and play it
    async fn speak(&mut self, text: &str, role: AudioRole) -> Result<PathBuf> {
        let output_path = self.audio.path_for(role);

        self.transition(SessionState::Synthesizing);
        info!("Generating voice...");
        self.collaborators
            .synthesizer
            .synthesize(text, &output_path, &self.profile.sovits_config)
            .await
            .context("Speech synthesis failed")?;

        self.transition(SessionState::Playing);
        info!("Playing...");
        self.collaborators
            .player
            .play(&output_path)
            .await
            .context("Playback failed")?;

        Ok(output_path)
    }

    fn log_interrupt(&self) {
        let summary = self.memory.get_session_summary();
        info!("Interrupt detected");
        info!("Session: {} exchanges", summary.total_exchanges);
    }

    fn terminate(&mut self) {
        self.transition(SessionState::Terminated);
        info!("Final cleanup...");
        self.cleanup_audio(self.settings.final_keep);
        info!("Session closed");
    }

    fn cleanup_audio(&self, keep_latest: usize) {
        match self.audio.cleanup(keep_latest) {
            Ok(report) => debug!(
                "Kept {} audio files, deleted {}",
                report.retained.len(),
                report.deleted.len()
            ),
            Err(e) => warn!("Audio cleanup failed: {:#}", e),
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session state: {} -> {}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_phrases_match_trimmed_and_case_insensitive() {
        assert!(is_exit_phrase("exit"));
        assert!(is_exit_phrase("  Goodbye \n"));
        assert!(is_exit_phrase("QUIT"));
        assert!(is_exit_phrase("Bye"));
    }

    #[test]
    fn other_text_is_not_an_exit_phrase() {
        assert!(!is_exit_phrase("bye bye"));
        assert!(!is_exit_phrase("goodbye senpai"));
        assert!(!is_exit_phrase(""));
    }
}
