use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub llm: LlmConfig,
    pub asr: AsrConfig,
    pub tts: TtsConfig,
    pub playback: PlaybackConfig,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub audio_dir: PathBuf,
    pub character_dir: PathBuf,
    pub character_file: PathBuf,
    pub data_dir: PathBuf,
    pub history_file: PathBuf,
    pub logs_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("audio"),
            character_dir: PathBuf::from("character_files"),
            character_file: PathBuf::from("character_files/character_config.yaml"),
            data_dir: PathBuf::from("data"),
            history_file: PathBuf::from("data/chat_history.json"),
            logs_dir: PathBuf::from("logs"),
            log_file: PathBuf::from("logs/saki.log"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub base_url: String,
    /// Number of session exchanges sent as context with each query
    pub context_turns: usize,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 1024,
            temperature: 0.8,
            base_url: "https://api.anthropic.com".to_string(),
            context_turns: 5,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AsrConfig {
    /// OpenAI-compatible transcription server (e.g. faster-whisper-server)
    pub base_url: String,
    pub model: String,
    pub language: String,
    /// Recorder invocation; `{output}` is replaced by the WAV path to write
    pub record_command: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/v1".to_string(),
            model: "base.en".to_string(),
            language: "en".to_string(),
            record_command: [
                "sox", "-d", "-r", "16000", "-c", "1", "-b", "16", "{output}", "silence", "1",
                "0.1", "1%", "1", "1.5", "1%",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// GPT-SoVITS api_v2 server
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9880".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        let command = if cfg!(target_os = "macos") { "afplay" } else { "aplay" };
        Self {
            command: command.to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Audio files kept by periodic cleanup
    pub keep_latest: usize,
    /// Periodic cleanup runs after this many completed content turns
    pub cleanup_every: u64,
    /// Audio files kept by the cleanup on termination
    pub final_keep: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            keep_latest: 5,
            cleanup_every: 5,
            final_keep: 1,
        }
    }
}

impl Config {
    /// Load configuration from an optional file plus `VOICE_COMPANION_*` environment overrides.
    ///
    /// Nested keys use a double underscore, e.g. `VOICE_COMPANION_LLM__MODEL`.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("VOICE_COMPANION")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Create every directory the session writes into
    pub fn ensure_directories(&self) -> Result<()> {
        let dirs = [
            &self.paths.audio_dir,
            &self.paths.character_dir,
            &self.paths.data_dir,
            &self.paths.logs_dir,
        ];
        for dir in dirs {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        info!("Directories verified");
        Ok(())
    }

    /// Read the LLM API key from the environment variable named in `llm.api_key_env`
    pub fn api_key(&self) -> Result<String> {
        let key = std::env::var(&self.llm.api_key_env)
            .with_context(|| format!("{} is not set", self.llm.api_key_env))?;
        if key.trim().is_empty() {
            anyhow::bail!("{} is empty", self.llm.api_key_env);
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = Config::load("/nonexistent/voice-companion").unwrap();
        assert_eq!(cfg.llm.context_turns, 5);
        assert_eq!(cfg.retention.keep_latest, 5);
        assert_eq!(cfg.retention.cleanup_every, 5);
        assert_eq!(cfg.retention.final_keep, 1);
        assert_eq!(cfg.paths.history_file, PathBuf::from("data/chat_history.json"));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("companion.toml");
        fs::write(
            &path,
            "[llm]\nmodel = \"claude-test\"\ncontext_turns = 3\n\n[retention]\nkeep_latest = 2\n",
        )
        .unwrap();

        let cfg = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.llm.model, "claude-test");
        assert_eq!(cfg.llm.context_turns, 3);
        assert_eq!(cfg.llm.max_tokens, 1024);
        assert_eq!(cfg.retention.keep_latest, 2);
        assert_eq!(cfg.retention.final_keep, 1);
    }
}
