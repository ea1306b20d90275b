//! Anthropic messages backend. API key travels in the `x-api-key` header.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::backend::{GenerationBackend, GenerationLimits, error_for_status, extract_text};
use crate::error::BackendError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicBackend {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicBackend {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl GenerationBackend for AnthropicBackend {
    fn name(&self) -> &'static str {
        "Anthropic"
    }

    async fn generate(
        &self,
        prompt: &str,
        limits: GenerationLimits,
    ) -> Result<String, BackendError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: limits.max_output_tokens,
            messages: vec![MessageParam {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                provider: self.name(),
                source,
            })?;

        let response = error_for_status(self.name(), response).await?;
        extract_text(self.name(), response, |payload: MessagesResponse| {
            payload
                .content
                .into_iter()
                .next()
                .map(|block| block.text)
                .unwrap_or_default()
        })
        .await
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<MessageParam<'a>>,
}

#[derive(Serialize)]
struct MessageParam<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Default, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_expected_envelope() {
        let request = MessagesRequest {
            model: "claude-3-5-haiku-latest",
            max_tokens: 4000,
            messages: vec![MessageParam {
                role: "user",
                content: "group these",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "claude-3-5-haiku-latest");
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["messages"][0]["content"], "group these");
    }

    #[test]
    fn response_text_is_extracted_from_first_block() {
        let payload: MessagesResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "[]"}], "stop_reason": "end_turn"}"#,
        )
        .unwrap();
        let text = payload
            .content
            .into_iter()
            .next()
            .map(|b| b.text)
            .unwrap_or_default();
        assert_eq!(text, "[]");
    }

    #[test]
    fn unexpected_shape_yields_empty_output() {
        let payload: MessagesResponse = serde_json::from_str(r#"{"type": "error"}"#).unwrap();
        assert!(payload.content.is_empty());
    }
}
