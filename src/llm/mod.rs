//! LLM client for answer generation.
//!
//! The recommender only needs "prompt in, text out", captured by the
//! [`TextGenerator`] trait. [`ChatCompletionsClient`] implements it against
//! any OpenAI-compatible `/chat/completions` endpoint; the [`Provider`] is
//! detected from the base URL.

pub mod chat_completions;
pub mod provider;

pub use chat_completions::ChatCompletionsClient;
pub use provider::Provider;

use async_trait::async_trait;

/// LLM connection and model settings.
#[derive(Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API (e.g., `https://generativelanguage.googleapis.com`).
    pub base_url: String,
    /// Optional API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `gemini-1.5-flash`).
    pub model: String,
    /// Provider type (auto-detected from `base_url`).
    pub provider: Provider,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("provider", &self.provider)
            .finish()
    }
}

impl LlmSettings {
    /// Settings with the provider detected from `base_url`.
    ///
    /// Azure routes by deployment rather than model; the model name is used
    /// as the deployment name.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let model = model.into();
        let provider = match Provider::detect_from_url(&base_url) {
            Provider::AzureOpenAI { api_version, .. } => Provider::AzureOpenAI {
                deployment_name: model.clone(),
                api_version,
            },
            other => other,
        };
        Self {
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            provider,
        }
    }

    /// Full `/chat/completions` URL for these settings.
    #[must_use]
    pub fn chat_url(&self) -> String {
        self.provider.build_chat_url(&self.base_url)
    }
}

/// Produces a completion for a single prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync + std::fmt::Debug {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
