//! Error types raised at the collaborator boundaries
//!
//! The session loop only distinguishes two classes: a failed language model
//! query ([`LlmError`]), which is replaced by an in-character fallback reply,
//! and everything else ([`CollaboratorError`] or plumbing failures), which ends
//! the session.

use thiserror::Error;

/// Failures of the language model query
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API credential missing: {0}")]
    MissingCredential(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response contained no text")]
    EmptyResponse,
}

/// Failures of recording, transcription, synthesis or playback
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Recording error: {0}")]
    Recording(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
