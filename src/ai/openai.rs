//! OpenAI chat-completions provider.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::{Result, VaultError};

use super::ChatModel;

/// OpenAI REST API base.
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Chat-model provider speaking the OpenAI chat-completions API.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    /// Build a provider with an explicit key and model.
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: OPENAI_API_BASE.to_string(),
            client: Self::build_client(),
        }
    }

    /// Build from config. Returns `None` when no API key is configured, in
    /// which case the AI endpoints report a configuration error instead.
    pub fn from_config(config: &ModelConfig) -> Option<Self> {
        let key = config.api_key.as_deref().filter(|k| !k.is_empty())?;
        Some(Self::new(key, &config.model))
    }

    /// Point the provider at a different base URL (tests).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn build_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client")
    }

    /// Request body for a plain text completion.
    fn build_chat_body(&self, system: &str, user: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ]
        })
    }

    /// Request body with an inline base64 image part.
    fn build_vision_body(&self, system: &str, user: &str, image: &[u8]) -> Value {
        let b64 = base64::engine::general_purpose::STANDARD.encode(image);
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": [
                    { "type": "text", "text": user },
                    { "type": "image_url", "image_url": {
                        "url": format!("data:image/jpeg;base64,{b64}")
                    }}
                ]}
            ]
        })
    }

    /// Pull the assistant text out of a chat-completions response.
    pub fn extract_text(response: &Value) -> Option<String> {
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
    }

    async fn send(&self, body: Value) -> Result<String> {
        debug!(model = %self.model, "chat-completions request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| VaultError::Provider(format!("request failed: {e}")))?;

        if response.status().is_success() {
            let json: Value = response
                .json()
                .await
                .map_err(|e| VaultError::Provider(format!("unparseable response: {e}")))?;
            return Self::extract_text(&json)
                .ok_or_else(|| VaultError::Provider("response carried no text".into()));
        }

        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();

        // Surface the API's own message when the error body is JSON.
        let message = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(error_text);
        Err(VaultError::Provider(format!("API error {status}: {message}")))
    }
}

#[async_trait]
impl ChatModel for OpenAiProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.send(self.build_chat_body(system, user)).await
    }

    async fn complete_vision(&self, system: &str, user: &str, image: &[u8]) -> Result<String> {
        self.send(self.build_vision_body(system, user, image)).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}
