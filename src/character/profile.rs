use crate::storage::write_atomic;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_CHARACTER_NAME: &str = "Saki Kimura";

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are Saki Kimura, a snarky but caring anime girl AI assistant.

Key traits:
- You always call the user "senpai"
- You're intelligent and helpful, but express yourself with personality
- You use occasional anime expressions like "ehh?!", "mou~", "baka!", "sugoi!"
- You're a bit tsundere - act annoyed but you actually care
- You're knowledgeable about many topics but keep responses natural and conversational
- You remember context from the conversation and reference it
- You avoid being overly formal or robotic

Keep responses concise (2-4 sentences usually) unless the topic requires more depth.
Be engaging and fun while still being genuinely helpful!"#;

const DEFAULT_REFERENCE_SAMPLE: &str = "main_sample.wav";
const DEFAULT_REFERENCE_TEXT: &str = "This is a sample voice for you to just get started with.";

/// Voice settings forwarded verbatim to the speech synthesizer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default)]
    pub text_lang: String,

    #[serde(default)]
    pub prompt_lang: String,

    /// Reference recording the synthesizer clones the voice from
    #[serde(default)]
    pub ref_audio_path: String,

    /// Transcript of the reference recording
    #[serde(default)]
    pub prompt_text: String,

    /// Any other synthesizer parameters, preserved as written
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Free-form persona traits, kept as written
pub type PersonalityTraits = serde_json::Map<String, serde_json::Value>;

/// Persona and voice of the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub system_prompt: String,
    pub sovits_config: VoiceConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality_traits: Option<PersonalityTraits>,
}

/// On-disk shape; every field may be missing or unusable on its own
#[derive(Debug, Default)]
struct StoredProfile {
    name: Option<String>,
    system_prompt: Option<String>,
    sovits_config: Option<VoiceConfig>,
    personality_traits: Option<PersonalityTraits>,
}

impl CharacterProfile {
    /// Built-in persona whose voice references `character_dir/main_sample.wav`
    pub fn default_for(character_dir: &Path) -> Self {
        Self {
            name: DEFAULT_CHARACTER_NAME.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            sovits_config: VoiceConfig {
                text_lang: "en".to_string(),
                prompt_lang: "en".to_string(),
                ref_audio_path: character_dir
                    .join(DEFAULT_REFERENCE_SAMPLE)
                    .display()
                    .to_string(),
                prompt_text: DEFAULT_REFERENCE_TEXT.to_string(),
                extra: serde_json::Map::new(),
            },
            personality_traits: Some(default_traits()),
        }
    }

    /// Load the stored profile, or create and persist the default one.
    ///
    /// Never fails: an unreadable or malformed file degrades to the default
    /// profile (the file itself is left untouched), and a failure to persist a
    /// freshly created default is only logged.
    pub fn load_or_create(path: &Path, character_dir: &Path) -> Self {
        let default = Self::default_for(character_dir);

        if !path.exists() {
            warn!(
                "Character profile not found at {}, creating default",
                path.display()
            );
            if let Err(e) = default.persist(path) {
                warn!("Failed to persist default character profile: {:#}", e);
            }
            return default;
        }

        match Self::read(path) {
            Ok(stored) => {
                let profile = default.merged_with(stored);
                info!("Character profile loaded: {}", profile.name);
                profile
            }
            Err(e) => {
                warn!(
                    "Failed to read character profile {}, using default: {:#}",
                    path.display(),
                    e
                );
                default
            }
        }
    }

    /// Overwrite the stored profile with this one
    pub fn persist(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize character profile")?;
        write_atomic(path, yaml.as_bytes())
            .with_context(|| format!("Failed to write character profile: {}", path.display()))?;
        info!("Character profile saved to {}", path.display());
        Ok(())
    }

    fn read(path: &Path) -> Result<StoredProfile> {
        let text = fs::read_to_string(path).context("Failed to read profile file")?;
        let document: serde_yaml::Value =
            serde_yaml::from_str(&text).context("Failed to parse profile YAML")?;

        let fields = match document {
            serde_yaml::Value::Null => return Ok(StoredProfile::default()),
            serde_yaml::Value::Mapping(fields) => fields,
            _ => anyhow::bail!("Profile is not a mapping"),
        };

        Ok(StoredProfile {
            name: stored_field(&fields, "name"),
            system_prompt: stored_field(&fields, "system_prompt"),
            sovits_config: stored_field(&fields, "sovits_config"),
            personality_traits: stored_field(&fields, "personality_traits"),
        })
    }

    fn merged_with(self, stored: StoredProfile) -> Self {
        Self {
            name: stored.name.unwrap_or(self.name),
            system_prompt: stored.system_prompt.unwrap_or(self.system_prompt),
            sovits_config: stored.sovits_config.unwrap_or(self.sovits_config),
            personality_traits: stored.personality_traits.or(self.personality_traits),
        }
    }
}

fn default_traits() -> PersonalityTraits {
    let mut traits = PersonalityTraits::new();
    traits.insert("snarky_level".to_string(), 7.into());
    traits.insert("helpfulness".to_string(), 9.into());
    traits.insert("tsundere_mode".to_string(), true.into());
    traits
}

/// One top-level field; a value of the wrong shape counts as missing
fn stored_field<T: DeserializeOwned>(fields: &serde_yaml::Mapping, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    match serde_yaml::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring unusable profile field '{}', using default: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_and_persists_default_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("character_config.yaml");

        let profile = CharacterProfile::load_or_create(&path, dir.path());

        assert_eq!(profile.name, DEFAULT_CHARACTER_NAME);
        assert!(profile.system_prompt.contains("senpai"));
        assert!(profile.sovits_config.ref_audio_path.ends_with("main_sample.wav"));
        assert!(path.exists(), "default profile should be written");
    }

    #[test]
    fn partial_profile_is_filled_from_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("character_config.yaml");
        fs::write(&path, "name: Hoshi\n").unwrap();

        let profile = CharacterProfile::load_or_create(&path, dir.path());

        assert_eq!(profile.name, "Hoshi");
        assert_eq!(profile.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(profile.sovits_config.text_lang, "en");
        assert_eq!(profile.personality_traits, Some(default_traits()));
    }

    #[test]
    fn partial_traits_keep_custom_persona() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("character_config.yaml");
        fs::write(
            &path,
            "name: Hoshi\nsystem_prompt: custom prompt\npersonality_traits:\n  snarky_level: 7\n",
        )
        .unwrap();

        let profile = CharacterProfile::load_or_create(&path, dir.path());

        assert_eq!(profile.name, "Hoshi");
        assert_eq!(profile.system_prompt, "custom prompt");
        let traits = profile.personality_traits.unwrap();
        assert_eq!(traits.len(), 1);
        assert_eq!(traits["snarky_level"], 7);
    }

    #[test]
    fn badly_shaped_field_only_resets_that_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("character_config.yaml");
        fs::write(
            &path,
            "name: Hoshi\nsovits_config: [1, 2]\npersonality_traits: very snarky\n",
        )
        .unwrap();

        let profile = CharacterProfile::load_or_create(&path, dir.path());

        assert_eq!(profile.name, "Hoshi");
        assert_eq!(profile.sovits_config.text_lang, "en");
        assert_eq!(profile.personality_traits, Some(default_traits()));
    }

    #[test]
    fn malformed_profile_degrades_without_overwriting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("character_config.yaml");
        fs::write(&path, "name: [unterminated\n").unwrap();

        let profile = CharacterProfile::load_or_create(&path, dir.path());

        assert_eq!(profile.name, DEFAULT_CHARACTER_NAME);
        assert_eq!(fs::read_to_string(&path).unwrap(), "name: [unterminated\n");
    }

    #[test]
    fn unknown_voice_parameters_survive_a_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("character_config.yaml");
        let mut profile = CharacterProfile::default_for(dir.path());
        profile
            .sovits_config
            .extra
            .insert("speed_factor".to_string(), serde_json::json!(1.1));
        profile.persist(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("speed_factor"));

        let reloaded = CharacterProfile::load_or_create(&path, dir.path());
        assert_eq!(reloaded, profile);
    }
}
