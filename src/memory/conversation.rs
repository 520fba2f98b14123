use super::exchange::{ChatMessage, Exchange};
use crate::storage::write_atomic;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Summary of the exchanges recorded by this process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub total_exchanges: usize,
    /// Timestamp of the first exchange of the session, if any
    pub session_start: Option<String>,
}

/// Persisted conversation history and the current session.
///
/// The session is the tail of the history starting at `session_start`, so it
/// can never diverge from what is persisted.
pub struct ConversationMemory {
    path: PathBuf,
    history: Vec<Exchange>,
    session_start: usize,
}

impl ConversationMemory {
    /// Open the history file at `path`, starting a new empty session
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let history = Self::load_history(&path);
        let session_start = history.len();

        Self {
            path,
            history,
            session_start,
        }
    }

    /// Read the full persisted history.
    ///
    /// A missing, unreadable or malformed file yields an empty history.
    pub fn load_history(path: &Path) -> Vec<Exchange> {
        if !path.exists() {
            return Vec::new();
        }

        let parsed = fs::read_to_string(path)
            .context("Failed to read history file")
            .and_then(|text| {
                serde_json::from_str::<Vec<Exchange>>(&text).context("Failed to parse history")
            });

        match parsed {
            Ok(history) => history,
            Err(e) => {
                warn!(
                    "Chat history at {} is unusable, starting empty: {:#}",
                    path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Record an exchange and persist the whole history before returning.
    ///
    /// If the write fails the exchange is dropped again, so memory and disk stay equal.
    pub fn add_exchange(
        &mut self,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
    ) -> Result<&Exchange> {
        self.history.push(Exchange::now(user_text, assistant_text));

        if let Err(e) = self.save_history() {
            self.history.pop();
            return Err(e);
        }

        info!("Exchange saved to memory ({} total)", self.history.len());
        Ok(&self.history[self.history.len() - 1])
    }

    /// The last `max_turns` session exchanges as chronological user/assistant messages
    pub fn get_recent_context(&self, max_turns: usize) -> Vec<ChatMessage> {
        let session = self.session();
        let start = session.len().saturating_sub(max_turns);

        session[start..]
            .iter()
            .flat_map(Exchange::to_messages)
            .collect()
    }

    pub fn get_session_summary(&self) -> SessionSummary {
        let session = self.session();
        SessionSummary {
            total_exchanges: session.len(),
            session_start: session.first().map(|e| e.timestamp.clone()),
        }
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    /// Exchanges recorded since this memory was opened
    pub fn session(&self) -> &[Exchange] {
        &self.history[self.session_start..]
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_history(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.history).context("Failed to serialize history")?;
        write_atomic(&self.path, json.as_bytes())
            .with_context(|| format!("Failed to write history: {}", self.path.display()))
    }
}
