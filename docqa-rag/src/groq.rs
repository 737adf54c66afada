//! Chat-completion client for Groq and other OpenAI-compatible endpoints.
//!
//! This module is only available when the `groq` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::LlmConfig;
use crate::error::{RagError, Result};
use crate::llm::{CompletionProvider, CompletionRequest};

const PROVIDER: &str = "Groq";

/// A [`CompletionProvider`] calling `{base_url}/chat/completions`.
///
/// Uses `reqwest` directly. The request timeout from [`LlmConfig`] applies
/// to the whole call; timeouts surface as [`RagError::UpstreamError`].
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{GroqClient, LlmConfig};
///
/// let client = GroqClient::new(LlmConfig::from_env()?)?;
/// ```
pub struct GroqClient {
    client: reqwest::Client,
    config: LlmConfig,
    endpoint: String,
}

impl GroqClient {
    /// Create a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the API key is empty or the HTTP
    /// client cannot be constructed.
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(RagError::ConfigError("API key must not be empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self { client, config, endpoint })
    }

    /// Create a client using the `GROQ_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(LlmConfig::from_env()?)
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

// ── Chat completion request/response types ─────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl<'a> ChatRequest<'a> {
    fn from_request(model: &'a str, request: &'a CompletionRequest, max_tokens: Option<u32>) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens.or(max_tokens),
        }
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| RagError::upstream(PROVIDER, "API returned no completion choices"))
}

// ── CompletionProvider implementation ──────────────────────────────

#[async_trait]
impl CompletionProvider for GroqClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!(
            provider = PROVIDER,
            model = %self.config.model,
            prompt_len = request.user.len(),
            "requesting completion"
        );

        let body = ChatRequest::from_request(&self.config.model, request, self.config.max_tokens);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "request timed out" } else { "request failed" };
                error!(provider = PROVIDER, error = %e, "{kind}");
                RagError::upstream(PROVIDER, format!("{kind}: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::upstream(PROVIDER, format!("API returned {status}: {detail}")));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::upstream(PROVIDER, format!("failed to parse response: {e}"))
        })?;

        first_choice_text(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_rejects_empty_key() {
        assert!(matches!(GroqClient::new(LlmConfig::new("  ")), Err(RagError::ConfigError(_))));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client =
            GroqClient::new(LlmConfig::new("k").with_base_url("http://localhost:8080/v1/")).unwrap();
        assert_eq!(client.endpoint, "http://localhost:8080/v1/chat/completions");
        assert_eq!(client.model(), crate::config::DEFAULT_MODEL);
    }

    #[test]
    fn test_request_shape() {
        let request = CompletionRequest::new("sys", "question");
        let body = ChatRequest::from_request("llama", &request, Some(256));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "llama",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "question"}
                ],
                "temperature": 0.0,
                "max_tokens": 256
            })
        );
    }

    #[test]
    fn test_response_parsing() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Blue."}}]
        }))
        .unwrap();
        assert_eq!(first_choice_text(response).unwrap(), "Blue.");

        let empty: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(first_choice_text(empty), Err(RagError::UpstreamError { .. })));
    }
}
