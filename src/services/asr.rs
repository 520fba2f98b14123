use super::Transcriber;
use crate::config::AsrConfig;
use crate::error::CollaboratorError;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Records with an external command, then transcribes through an
/// OpenAI-compatible `/audio/transcriptions` endpoint (e.g. faster-whisper-server).
pub struct WhisperTranscriber {
    client: reqwest::Client,
    base_url: String,
    model: String,
    language: String,
    record_command: Vec<String>,
}

impl WhisperTranscriber {
    pub fn new(config: &AsrConfig) -> Result<Self, CollaboratorError> {
        if config.record_command.is_empty() {
            return Err(CollaboratorError::Recording(
                "asr.record_command is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::Transcription(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            language: config.language.clone(),
            record_command: config.record_command.clone(),
        })
    }

    async fn record(&self, output: &Path) -> Result<(), CollaboratorError> {
        let (program, args) = record_invocation(&self.record_command, output);

        debug!("Recording with: {} {:?}", program, args);

        let status = Command::new(&program)
            .args(&args)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| CollaboratorError::Recording(format!("failed to start {}: {}", program, e)))?;

        if !status.success() {
            return Err(CollaboratorError::Recording(format!(
                "{} exited with {}",
                program, status
            )));
        }

        Ok(())
    }
}

/// Program and arguments with the placeholder replaced by `output`
fn record_invocation(command: &[String], output: &Path) -> (String, Vec<String>) {
    let output = output.display().to_string();
    let mut parts = command
        .iter()
        .map(|part| part.replace(OUTPUT_PLACEHOLDER, &output));

    let program = parts.next().unwrap_or_default();
    (program, parts.collect())
}

#[async_trait::async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_output_path: &Path) -> Result<String, CollaboratorError> {
        self.record(audio_output_path).await?;

        let wav = tokio::fs::read(audio_output_path).await?;
        if wav.is_empty() {
            return Ok(String::new());
        }

        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("conversation.wav")
            .mime_str("audio/wav")
            .map_err(|e| CollaboratorError::Transcription(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let url = format!("{}/audio/transcriptions", self.base_url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CollaboratorError::Transcription(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Transcription(format!(
                "STT API error {}: {}",
                status, body
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Transcription(e.to_string()))?;
        let text = json
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .trim()
            .to_string();

        info!("Transcribed {} chars", text.len());
        Ok(text)
    }
}
