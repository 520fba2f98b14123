//! Conversation history and session windowing
//!
//! This module provides:
//! - `Exchange`: one recorded user/assistant pair
//! - `ConversationMemory`: the persisted history plus the current session's tail
//! - `ChatMessage`: role-tagged messages sent to the language model as context

mod conversation;
mod exchange;

pub use conversation::{ConversationMemory, SessionSummary};
pub use exchange::{ChatMessage, Exchange, Role};
