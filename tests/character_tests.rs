// Integration tests for character profile storage

use anyhow::Result;
use std::fs;
use tempfile::TempDir;
use voice_companion::character::{CharacterProfile, PersonalityTraits, DEFAULT_CHARACTER_NAME};

#[test]
fn test_first_run_creates_default_profile_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let character_dir = temp_dir.path().join("character_files");
    let path = character_dir.join("character_config.yaml");

    let profile = CharacterProfile::load_or_create(&path, &character_dir);

    assert_eq!(profile.name, DEFAULT_CHARACTER_NAME);
    let yaml = fs::read_to_string(&path)?;
    assert!(yaml.contains("sovits_config"));
    assert!(yaml.contains("ref_audio_path"));
    assert!(yaml.contains("main_sample.wav"));

    // Second run loads the stored copy unchanged
    let reloaded = CharacterProfile::load_or_create(&path, &character_dir);
    assert_eq!(reloaded, profile);

    Ok(())
}

#[test]
fn test_persist_then_load_is_field_for_field_equal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("character_config.yaml");

    let mut profile = CharacterProfile::default_for(temp_dir.path());
    profile.name = "Ayaka Mori".to_string();
    profile.system_prompt = "Eres una asistente amable. 優しく話してね。".to_string();
    profile.sovits_config.prompt_lang = "ja".to_string();
    let mut traits = PersonalityTraits::new();
    traits.insert("snarky_level".to_string(), serde_json::json!(2));
    traits.insert("catchphrase".to_string(), serde_json::json!("ara ara"));
    profile.personality_traits = Some(traits);
    profile.persist(&path)?;

    let loaded = CharacterProfile::load_or_create(&path, temp_dir.path());

    assert_eq!(loaded.name, profile.name);
    assert_eq!(loaded.system_prompt, profile.system_prompt);
    assert_eq!(loaded.sovits_config, profile.sovits_config);
    assert_eq!(loaded.personality_traits, profile.personality_traits);

    Ok(())
}

#[test]
fn test_non_ascii_is_written_verbatim() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("character_config.yaml");

    let mut profile = CharacterProfile::default_for(temp_dir.path());
    profile.name = "木村 咲".to_string();
    profile.persist(&path)?;

    assert!(fs::read_to_string(&path)?.contains("木村 咲"));

    Ok(())
}

#[test]
fn test_partial_traits_do_not_discard_stored_persona() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("character_config.yaml");
    fs::write(
        &path,
        "name: Hoshi\nsystem_prompt: custom prompt\npersonality_traits: {snarky_level: 7}\n",
    )?;

    let profile = CharacterProfile::load_or_create(&path, temp_dir.path());

    assert_eq!(profile.name, "Hoshi");
    assert_eq!(profile.system_prompt, "custom prompt");
    assert_eq!(
        profile.personality_traits.map(|t| t.len()),
        Some(1),
        "traits should be kept as written"
    );

    Ok(())
}

#[test]
fn test_unreadable_profile_falls_back_to_default() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("character_config.yaml");
    fs::write(&path, "sovits_config: \"not a mapping\"\n")?;

    let profile = CharacterProfile::load_or_create(&path, temp_dir.path());

    assert_eq!(profile, CharacterProfile::default_for(temp_dir.path()));

    Ok(())
}
