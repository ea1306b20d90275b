//! Local Ollama daemon backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::backend::{GenerationBackend, GenerationLimits, error_for_status, extract_text};
use crate::error::BackendError;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.1";

/// Backend speaking to a local Ollama daemon. No credentials required.
pub struct OllamaBackend {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    async fn generate(
        &self,
        prompt: &str,
        limits: GenerationLimits,
    ) -> Result<String, BackendError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                num_predict: limits.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                provider: self.name(),
                source,
            })?;

        let response = error_for_status(self.name(), response).await?;
        extract_text(self.name(), response, |payload: OllamaResponse| {
            payload.response
        })
        .await
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Default, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_expected_envelope() {
        let request = OllamaRequest {
            model: "llama3.1",
            prompt: "group these",
            stream: false,
            options: OllamaOptions { num_predict: 4000 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.1");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 4000);
    }

    #[test]
    fn response_text_is_extracted() {
        let payload: OllamaResponse =
            serde_json::from_str(r#"{"response": "[]", "done": true}"#).unwrap();
        assert_eq!(payload.response, "[]");
    }

    #[test]
    fn unexpected_shape_yields_empty_output() {
        let payload: OllamaResponse = serde_json::from_str(r#"{"error": "boom"}"#).unwrap();
        assert_eq!(payload.response, "");
    }
}
