//! Chat Assistant — farming Q&A relay to a hosted completion model.
//!
//! A single-turn request with a fixed expert-agriculture system prompt.
//! The backend sits behind [`ChatBackend`] so the API layer and tests can
//! swap implementations; failures surface as typed [`ChatError`] variants
//! for the presentation layer to render per kind. No retries.

use crate::config::ChatConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// System prompt sent with every user query.
pub const SYSTEM_PROMPT: &str = "You are an expert agriculture assistant. \
Help farmers with crops, fertilizers, pests, weather, and related queries.";

/// Chat relay errors. Each variant renders differently at the edge;
/// none is retried and none is silently swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed provider response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Provider returned no choices")]
    EmptyResponse,
    #[error("No API key configured")]
    MissingApiKey,
}

/// Unified interface for chat backends.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Relay one free-text query and return the assistant's answer.
    async fn ask(&self, query: &str) -> Result<String, ChatError>;

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}

// ============================================================================
// Wire Schema (OpenAI-style chat completion)
// ============================================================================

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

// ============================================================================
// HTTP Backend
// ============================================================================

/// Chat backend talking to an OpenAI-compatible completion endpoint.
#[derive(Clone)]
pub struct HttpChatBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpChatBackend {
    /// Create a backend from config.
    pub fn new(config: &ChatConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn ask(&self, query: &str) -> Result<String, ChatError> {
        if self.api_key.is_empty() {
            return Err(ChatError::MissingApiKey);
        }

        let request = CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: query,
                },
            ],
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%status, "Chat completion rejected by provider");
            return Err(ChatError::Status(status));
        }

        let body = resp.bytes().await?;
        let response: CompletionResponse = serde_json::from_slice(&body)?;
        let answer = response
            .choices
            .into_iter()
            .next()
            .ok_or(ChatError::EmptyResponse)?
            .message
            .content;
        Ok(answer)
    }

    fn backend_name(&self) -> &'static str {
        "http-chat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = CompletionRequest {
            model: "gpt-3.5-turbo",
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: "When should I sow wheat?",
                },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "When should I sow wheat?");
    }

    #[test]
    fn test_first_choice_consumed() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Sow in early winter."}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.choices[0].message.content, "Sow in early winter.");
    }

    #[test]
    fn test_empty_choices_is_error() {
        let response: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(response.choices.is_empty());
    }
}
