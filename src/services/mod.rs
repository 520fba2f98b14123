//! External collaborators of the session loop
//!
//! The orchestrator only depends on these traits:
//! - `Transcriber`: record the user and turn the recording into text
//! - `LanguageModel`: produce the assistant reply for the new user text
//! - `SpeechSynthesizer`: render text to a playable WAV file
//! - `AudioPlayer`: play a file and block until it finishes
//!
//! Production implementations talk to a Whisper-compatible server, the
//! Anthropic Messages API, a GPT-SoVITS server and a command line player.

pub mod asr;
pub mod llm;
pub mod playback;
pub mod tts;

use crate::character::VoiceConfig;
use crate::error::{CollaboratorError, LlmError};
use crate::memory::ChatMessage;
use std::path::Path;

pub use asr::WhisperTranscriber;
pub use llm::ClaudeClient;
pub use playback::CommandPlayer;
pub use tts::SovitsClient;

/// Speech-to-text for one user turn
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Record the user and return the transcription, possibly blank.
    ///
    /// The raw recording is written to `audio_output_path` for debugging.
    async fn transcribe(&self, audio_output_path: &Path) -> Result<String, CollaboratorError>;
}

#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Reply to `new_user_text` given the persona prompt and prior messages
    async fn complete(
        &self,
        system_prompt: &str,
        context: &[ChatMessage],
        new_user_text: &str,
    ) -> Result<String, LlmError>;
}

#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Write a playable audio file for `text` at `output_path`
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        voice: &VoiceConfig,
    ) -> Result<(), CollaboratorError>;
}

#[async_trait::async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play `path`, returning once playback has finished
    async fn play(&self, path: &Path) -> Result<(), CollaboratorError>;
}

/// The four collaborators a session needs
pub struct Collaborators {
    pub transcriber: Box<dyn Transcriber>,
    pub llm: Box<dyn LanguageModel>,
    pub synthesizer: Box<dyn SpeechSynthesizer>,
    pub player: Box<dyn AudioPlayer>,
}
