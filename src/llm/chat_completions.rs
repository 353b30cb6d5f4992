//! OpenAI Chat Completions API client.
//!
//! Sends a single user message to `/chat/completions` (non-streaming) and
//! returns the assistant's text.

use anyhow::Context;
use async_trait::async_trait;

use super::{LlmSettings, TextGenerator};

/// Client for the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Create a new client with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.settings.model,
            "stream": false,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let url = self.settings.chat_url();

        let mut rb = self.http.post(&url).json(&self.request_body(prompt));
        if let Some(k) = &self.settings.api_key {
            rb = match self.settings.provider {
                super::Provider::AzureOpenAI { .. } => rb.header("api-key", k),
                _ => rb.bearer_auth(k),
            };
        }

        let started = std::time::Instant::now();
        let resp = rb.send().await?.error_for_status()?;
        let v: serde_json::Value = resp.json().await?;

        tracing::debug!(
            model = %self.settings.model,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Completion received"
        );

        extract_content(&v)
    }
}

/// Pull `choices[0].message.content` out of a completion response.
fn extract_content(v: &serde_json::Value) -> anyhow::Result<String> {
    v["choices"][0]["message"]["content"]
        .as_str()
        .map(ToString::to_string)
        .context("completion response has no message content")
}
