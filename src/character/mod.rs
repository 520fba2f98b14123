//! Character persona and voice configuration
//!
//! The profile is loaded once at startup with [`CharacterProfile::load_or_create`]
//! and stays read-only for the rest of the session.

mod profile;

pub use profile::{CharacterProfile, PersonalityTraits, VoiceConfig, DEFAULT_CHARACTER_NAME};
