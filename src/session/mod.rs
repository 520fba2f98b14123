//! Turn-taking session loop
//!
//! This module provides the `SessionOrchestrator` that drives each turn:
//! - Listening and transcription of the user's speech
//! - Exit phrase detection and the spoken farewell
//! - Language model query with a bounded context window
//! - Speech synthesis, playback, then persistence of the exchange
//! - Periodic and final retention passes over the audio directory

mod config;
mod orchestrator;
mod shutdown;
mod state;

pub use config::SessionSettings;
pub use orchestrator::{is_exit_phrase, SessionOrchestrator, EXIT_PHRASES, FALLBACK_REPLY, FAREWELL_TEXT};
pub use shutdown::ShutdownSignal;
pub use state::{SessionState, Termination, TurnOutcome};
