//! Generation backend selection and the shared backend contract.

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;

use std::fmt;

use async_trait::async_trait;
use tracing::warn;

pub use anthropic::AnthropicBackend;
pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

use crate::config::Config;
use crate::error::{BackendError, ConfigError};

/// Characters of an error response body surfaced to the user.
const BODY_SNIPPET_LEN: usize = 300;

/// Output bounds passed to a backend for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationLimits {
    pub max_output_tokens: u32,
}

/// A text-generation backend.
///
/// One implementation per provider; each owns its own request/response
/// envelope and credential placement. Exactly one `generate` call is made
/// per pipeline run.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generate text for a prompt. A response whose text field is missing
    /// is returned as empty output rather than an error; HTTP and transport
    /// failures are fatal.
    async fn generate(
        &self,
        prompt: &str,
        limits: GenerationLimits,
    ) -> Result<String, BackendError>;
}

/// Supported generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    OpenAi,
    Anthropic,
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "Ollama",
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Gemini => "Gemini",
        }
    }

    /// Parse a configured provider identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ollama" => Some(Provider::Ollama),
            "openai" => Some(Provider::OpenAi),
            "anthropic" | "claude" => Some(Provider::Anthropic),
            "gemini" | "google" => Some(Provider::Gemini),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a configured provider name, falling back to the local default.
///
/// An unknown identifier is never fatal; the run proceeds on Ollama with a
/// warning so a typo in config degrades to the credential-free variant.
pub fn select_provider(name: &str) -> Provider {
    Provider::from_name(name).unwrap_or_else(|| {
        warn!("unknown provider '{name}', falling back to Ollama");
        println!("⚠ Unknown provider '{name}', using Ollama");
        Provider::Ollama
    })
}

/// Build the configured backend.
///
/// Hosted providers require an API key; its absence is a configuration
/// error raised here, before any network call is attempted.
pub fn create_backend(config: &Config) -> Result<Box<dyn GenerationBackend>, ConfigError> {
    match select_provider(&config.provider) {
        Provider::Ollama => Ok(Box::new(OllamaBackend::new(
            config.base_url.clone(),
            config.model.clone(),
        ))),
        Provider::OpenAi => {
            let key = require_api_key("OpenAI", config)?;
            Ok(Box::new(OpenAiBackend::new(
                key,
                config.base_url.clone(),
                config.model.clone(),
            )))
        }
        Provider::Anthropic => {
            let key = require_api_key("Anthropic", config)?;
            Ok(Box::new(AnthropicBackend::new(
                key,
                config.base_url.clone(),
                config.model.clone(),
            )))
        }
        Provider::Gemini => {
            let key = require_api_key("Gemini", config)?;
            Ok(Box::new(GeminiBackend::new(
                key,
                config.base_url.clone(),
                config.model.clone(),
            )))
        }
    }
}

fn require_api_key(provider: &'static str, config: &Config) -> Result<String, ConfigError> {
    config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey { provider })
}

/// Map a non-success response to a [`BackendError::HttpStatus`] carrying a
/// bounded body snippet, passing successful responses through.
pub(crate) async fn error_for_status(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unable to read response>".to_string());
    Err(BackendError::HttpStatus {
        provider,
        status: status.as_u16(),
        body: body.chars().take(BODY_SNIPPET_LEN).collect(),
    })
}

/// Read a successful response body, extracting text with `extract`.
///
/// Any body that fails to parse into the provider's envelope is treated as
/// empty output; the caller's reconciler reports it from there.
pub(crate) async fn extract_text<T, F>(
    provider: &'static str,
    response: reqwest::Response,
    extract: F,
) -> Result<String, BackendError>
where
    T: serde::de::DeserializeOwned + Default,
    F: FnOnce(T) -> String,
{
    let body = response
        .text()
        .await
        .map_err(|source| BackendError::Transport { provider, source })?;
    let payload: T = serde_json::from_str(&body).unwrap_or_else(|e| {
        warn!("{provider} response did not match the expected shape: {e}");
        T::default()
    });
    Ok(extract(payload))
}
