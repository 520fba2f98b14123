// Integration tests for conversation memory
//
// These tests verify that the history file always mirrors the in-memory
// history and that the context window only covers the current session.

use anyhow::Result;
use std::fs;
use tempfile::TempDir;
use voice_companion::memory::{ConversationMemory, Role};

#[test]
fn test_history_and_session_grow_with_each_exchange() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut memory = ConversationMemory::open(temp_dir.path().join("chat_history.json"));

    for n in 1..=7 {
        memory.add_exchange(format!("question {n}"), format!("answer {n}"))?;
        assert_eq!(memory.history_len(), n);
        assert_eq!(memory.session().len(), n);
    }

    Ok(())
}

#[test]
fn test_persisted_history_round_trips_in_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("chat_history.json");

    let mut memory = ConversationMemory::open(&path);
    for n in 1..=4 {
        memory.add_exchange(format!("question {n}"), format!("answer {n}"))?;
    }

    let reloaded = ConversationMemory::load_history(&path);
    assert_eq!(reloaded, memory.history());

    Ok(())
}

#[test]
fn test_history_file_is_a_json_array_of_exchange_records() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("chat_history.json");

    let mut memory = ConversationMemory::open(&path);
    memory.add_exchange("こんにちは", "Sugoi! ¿Qué tal, senpai?")?;

    let text = fs::read_to_string(&path)?;
    // Non-ASCII is written verbatim, not escaped
    assert!(text.contains("こんにちは"));
    assert!(text.contains("¿Qué tal"));

    let value: serde_json::Value = serde_json::from_str(&text)?;
    let entries = value.as_array().expect("history should be an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["user"], "こんにちは");
    assert!(entries[0]["timestamp"].is_string());

    Ok(())
}

#[test]
fn test_existing_history_is_kept_but_not_in_session() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("chat_history.json");
    fs::write(
        &path,
        r#"[{"timestamp": "2024-05-01T10:00:00.123456", "user": "old", "assistant": "older"}]"#,
    )?;

    let mut memory = ConversationMemory::open(&path);
    assert_eq!(memory.history_len(), 1);
    assert_eq!(memory.get_session_summary().total_exchanges, 0);
    assert_eq!(memory.get_session_summary().session_start, None);

    let first = memory.add_exchange("new", "newer")?.timestamp.clone();

    let reloaded = ConversationMemory::load_history(&path);
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded[0].timestamp, "2024-05-01T10:00:00.123456");
    assert_eq!(memory.get_session_summary().session_start, Some(first));

    Ok(())
}

#[test]
fn test_recent_context_scenario_twelve_exchanges() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut memory = ConversationMemory::open(temp_dir.path().join("chat_history.json"));
    for n in 1..=12 {
        memory.add_exchange(format!("user {n}"), format!("assistant {n}"))?;
    }

    let context = memory.get_recent_context(5);

    assert_eq!(context.len(), 10);
    for (i, pair) in context.chunks(2).enumerate() {
        let n = i + 8;
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[0].content, format!("user {n}"));
        assert_eq!(pair[1].role, Role::Assistant);
        assert_eq!(pair[1].content, format!("assistant {n}"));
    }

    Ok(())
}

#[test]
fn test_recent_context_is_bounded() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut memory = ConversationMemory::open(temp_dir.path().join("chat_history.json"));

    for n in 1..=6 {
        memory.add_exchange(format!("user {n}"), format!("assistant {n}"))?;
        for k in 0..=8 {
            let context = memory.get_recent_context(k);
            assert!(context.len() <= 2 * k);
            assert_eq!(context.len(), 2 * k.min(n));
            if let Some(last) = context.last() {
                assert_eq!(last.content, format!("assistant {n}"));
            }
        }
    }

    Ok(())
}

#[test]
fn test_malformed_history_loads_empty() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("chat_history.json");
    fs::write(&path, "{\"not\": \"an array\"}")?;

    assert!(ConversationMemory::load_history(&path).is_empty());

    Ok(())
}
