use super::LanguageModel;
use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::memory::ChatMessage;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage>,
}

impl ClaudeClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential(config.api_key_env.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request_body<'a>(
        &'a self,
        system_prompt: &'a str,
        context: &[ChatMessage],
        new_user_text: &str,
    ) -> MessagesRequest<'a> {
        let mut messages = context.to_vec();
        messages.push(ChatMessage::user(new_user_text));

        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: system_prompt,
            messages,
        }
    }
}

/// First text block of a Messages API response
fn extract_text(response: &Value) -> Result<String, LlmError> {
    let content = response
        .get("content")
        .and_then(|v| v.as_array())
        .ok_or_else(|| LlmError::InvalidResponse("missing content array".to_string()))?;

    content
        .iter()
        .find(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
        .and_then(|block| block.get("text").and_then(|t| t.as_str()))
        .map(str::to_string)
        .ok_or(LlmError::EmptyResponse)
}

#[async_trait::async_trait]
impl LanguageModel for ClaudeClient {
    async fn complete(
        &self,
        system_prompt: &str,
        context: &[ChatMessage],
        new_user_text: &str,
    ) -> Result<String, LlmError> {
        let body = self.request_body(system_prompt, context, new_user_text);
        let url = format!("{}/v1/messages", self.base_url);

        info!("Querying {} ({} context messages)", self.model, context.len());

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = extract_text(&json)?;
        debug!("Reply received ({} chars)", text.len());
        Ok(text)
    }
}
