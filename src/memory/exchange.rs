use chrono::Local;
use serde::{Deserialize, Serialize};

/// One recorded exchange, stored as `{timestamp, user, assistant}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// ISO-8601 local time at which the exchange was recorded
    pub timestamp: String,

    #[serde(rename = "user")]
    pub user_text: String,

    #[serde(rename = "assistant")]
    pub assistant_text: String,
}

impl Exchange {
    /// Create an exchange stamped with the current local time
    pub fn now(user_text: impl Into<String>, assistant_text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
        }
    }

    /// The exchange as a user message followed by an assistant message
    pub fn to_messages(&self) -> [ChatMessage; 2] {
        [
            ChatMessage::user(self.user_text.clone()),
            ChatMessage::assistant(self.assistant_text.clone()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Role-tagged message in the shape the Messages API expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
