//! Deterministic completion provider for tests and offline runs.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{RagError, Result};
use crate::llm::{CompletionProvider, CompletionRequest};

/// A [`CompletionProvider`] that returns a canned reply (or failure) and
/// records every request it receives.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::MockCompletionProvider;
///
/// let mock = MockCompletionProvider::new("The sky is blue.");
/// let reply = mock.complete(&request).await?;
/// assert_eq!(mock.call_count(), 1);
/// ```
#[derive(Debug)]
pub struct MockCompletionProvider {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionProvider {
    /// A mock that always answers with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: Ok(reply.into()), calls: AtomicUsize::new(0), requests: Mutex::default() }
    }

    /// A mock that always fails with an upstream error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { reply: Err(message.into()), calls: AtomicUsize::new(0), requests: Mutex::default() }
    }

    /// Number of `complete` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok().and_then(|requests| requests.last().cloned())
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(RagError::upstream(self.name(), message.clone())),
        }
    }
}
