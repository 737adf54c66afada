//! Completion provider trait for the remote language model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One chat-completion request: a system instruction and a user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Instruction placed in the system role.
    pub system: String,
    /// The user message (context plus question).
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional cap on generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Create a deterministic (temperature 0) request.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self { system: system.into(), user: user.into(), temperature: 0.0, max_tokens: None }
    }
}

/// A remote model that turns a prompt into text.
///
/// Implementations wrap specific backends behind one async call so the
/// answer generator can be exercised with a deterministic stub.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{CompletionProvider, CompletionRequest};
///
/// let reply = provider.complete(&CompletionRequest::new("Be brief.", "Hi")).await?;
/// ```
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Request one completion.
    ///
    /// Failures and timeouts are reported as
    /// [`RagError::UpstreamError`](crate::RagError::UpstreamError); callers
    /// do not retry.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
