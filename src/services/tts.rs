use super::SpeechSynthesizer;
use crate::character::VoiceConfig;
use crate::config::TtsConfig;
use crate::error::CollaboratorError;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// GPT-SoVITS `api_v2` client
pub struct SovitsClient {
    client: reqwest::Client,
    base_url: String,
}

impl SovitsClient {
    pub fn new(config: &TtsConfig) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::Synthesis(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Request body: the voice config as written, plus the text and output format
fn tts_request(text: &str, voice: &VoiceConfig) -> Result<Value, CollaboratorError> {
    let mut body = serde_json::to_value(voice)
        .map_err(|e| CollaboratorError::Synthesis(e.to_string()))?;

    if let Some(fields) = body.as_object_mut() {
        fields.insert("text".to_string(), Value::from(text));
        fields
            .entry("media_type")
            .or_insert_with(|| Value::from("wav"));
        fields.insert("streaming_mode".to_string(), Value::from(false));
    }

    Ok(body)
}

#[async_trait::async_trait]
impl SpeechSynthesizer for SovitsClient {
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        voice: &VoiceConfig,
    ) -> Result<(), CollaboratorError> {
        let body = tts_request(text, voice)?;
        let url = format!("{}/tts", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Synthesis(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Synthesis(format!(
                "TTS API error {}: {}",
                status, body
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| CollaboratorError::Synthesis(e.to_string()))?;
        tokio::fs::write(output_path, &audio).await?;

        info!(
            "Synthesized {} bytes to {}",
            audio.len(),
            output_path.display()
        );
        Ok(())
    }
}
