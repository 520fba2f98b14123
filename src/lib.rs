pub mod audio;
pub mod character;
pub mod config;
pub mod error;
pub mod memory;
pub mod services;
pub mod session;
pub mod storage;

pub use audio::{wav_duration, AudioFile, AudioLifecycleManager, AudioRole, CleanupReport};
pub use character::{CharacterProfile, PersonalityTraits, VoiceConfig};
pub use config::Config;
pub use error::{CollaboratorError, LlmError};
pub use memory::{ChatMessage, ConversationMemory, Exchange, Role, SessionSummary};
pub use services::{
    AudioPlayer, ClaudeClient, Collaborators, CommandPlayer, LanguageModel, SovitsClient,
    SpeechSynthesizer, Transcriber, WhisperTranscriber,
};
pub use session::{
    SessionOrchestrator, SessionSettings, SessionState, ShutdownSignal, Termination, TurnOutcome,
};
