use std::fmt;
use std::path::PathBuf;

/// Phase of the turn-taking loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Listening,
    Transcribing,
    /// Blank transcription, the turn is discarded
    Empty,
    /// Exit phrase recognised
    Farewell,
    Responding,
    Synthesizing,
    Playing,
    Persisting,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Listening => "listening",
            SessionState::Transcribing => "transcribing",
            SessionState::Empty => "empty",
            SessionState::Farewell => "farewell",
            SessionState::Responding => "responding",
            SessionState::Synthesizing => "synthesizing",
            SessionState::Playing => "playing",
            SessionState::Persisting => "persisting",
            SessionState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// How a single turn ended
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Nothing was said; back to listening
    Empty,
    /// Exit phrase handled, the session should end
    Farewell,
    /// Reply played and the exchange recorded
    Completed {
        reply: String,
        audio_path: PathBuf,
        /// Whether the language model failed and the fallback reply was used
        fallback: bool,
    },
}

/// Why the session loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    Farewell,
    Interrupted,
    /// A turn failed in a way that is not recoverable
    Fatal(String),
}
