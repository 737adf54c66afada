//! Grounded answer generation.
//!
//! [`AnswerGenerator`] turns a question plus retrieved context into an
//! [`Answer`]. Whether the model is called at all is decided locally: with no
//! context, or with no chunk reaching the relevance threshold, the fixed
//! [`FALLBACK_ANSWER`] is returned and the provider is never contacted.

use std::sync::Arc;

use tracing::{error, info};

use crate::document::{Answer, RetrievedChunk};
use crate::error::Result;
use crate::llm::{CompletionProvider, CompletionRequest};

/// Returned instead of a model reply when retrieval found nothing relevant.
pub const FALLBACK_ANSWER: &str =
    "I could not find enough relevant context in the document to answer that.";

/// The phrase the model is told to use when the context does not cover the question.
pub const REFUSAL_PHRASE: &str = "I don't know based on the provided context.";

/// System instruction sent with every grounded request.
pub fn system_instruction() -> String {
    format!(
        "You are a helpful assistant that answers questions about a document. \
         Answer using only the numbered context chunks provided by the user. \
         If the context is insufficient, say exactly: '{REFUSAL_PHRASE}'"
    )
}

/// Render the user message: context chunks labelled by rank, then the question.
pub fn build_prompt(query: &str, context: &[RetrievedChunk]) -> String {
    let chunks: String = context
        .iter()
        .enumerate()
        .map(|(rank, retrieved)| format!("[Chunk {}]\n{}\n\n", rank + 1, retrieved.chunk.text.trim()))
        .collect();
    format!("Context:\n\n{chunks}Question: {}\n\nAnswer:", query.trim())
}

/// Builds prompts from retrieved context and requests completions.
pub struct AnswerGenerator {
    provider: Arc<dyn CompletionProvider>,
    min_relevance: f32,
    temperature: f32,
}

impl AnswerGenerator {
    /// Create a generator over `provider` with the given relevance threshold.
    pub fn new(provider: Arc<dyn CompletionProvider>, min_relevance: f32) -> Self {
        Self { provider, min_relevance, temperature: 0.0 }
    }

    /// Set the sampling temperature for requests.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// `true` if the context is too weak to send to the model.
    pub fn should_fall_back(&self, context: &[RetrievedChunk]) -> bool {
        context.iter().all(|retrieved| retrieved.score < self.min_relevance)
    }

    /// Answer `query` from `context`.
    ///
    /// # Errors
    ///
    /// Propagates [`RagError::UpstreamError`](crate::RagError::UpstreamError)
    /// from the provider unchanged; nothing is retried.
    pub async fn generate(&self, query: &str, context: Vec<RetrievedChunk>) -> Result<Answer> {
        if self.should_fall_back(&context) {
            info!(
                context_len = context.len(),
                min_relevance = self.min_relevance,
                "no relevant context, returning fallback answer"
            );
            return Ok(Answer { text: FALLBACK_ANSWER.to_string(), sources: context, grounded: false });
        }

        let mut request = CompletionRequest::new(system_instruction(), build_prompt(query, &context));
        request.temperature = self.temperature;

        let text = self.provider.complete(&request).await.map_err(|e| {
            error!(provider = self.provider.name(), error = %e, "completion failed");
            e
        })?;

        info!(provider = self.provider.name(), context_len = context.len(), "generated answer");
        Ok(Answer { text: text.trim().to_string(), sources: context, grounded: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chunk;
    use crate::error::RagError;
    use crate::mock::MockCompletionProvider;

    fn retrieved(index: usize, text: &str, score: f32) -> RetrievedChunk {
        RetrievedChunk { chunk: Chunk { index, start: 0, text: text.into() }, score }
    }

    #[test]
    fn test_prompt_labels_chunks_by_rank() {
        let prompt = build_prompt(
            "What colour?",
            &[retrieved(4, " sky is blue ", 0.9), retrieved(1, "grass is green", 0.3)],
        );
        assert_eq!(
            prompt,
            "Context:\n\n[Chunk 1]\nsky is blue\n\n[Chunk 2]\ngrass is green\n\nQuestion: What colour?\n\nAnswer:"
        );
    }

    #[test]
    fn test_system_instruction_restricts_to_context() {
        let instruction = system_instruction();
        assert!(instruction.contains("only"));
        assert!(instruction.contains(REFUSAL_PHRASE));
    }

    #[tokio::test]
    async fn test_empty_context_falls_back_without_calling() {
        let mock = Arc::new(MockCompletionProvider::new("should not be used"));
        let generator = AnswerGenerator::new(mock.clone(), 0.05);
        let answer = generator.generate("anything", Vec::new()).await.unwrap();
        assert_eq!(answer.text, FALLBACK_ANSWER);
        assert!(!answer.grounded);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_low_scores_fall_back() {
        let mock = Arc::new(MockCompletionProvider::new("unused"));
        let generator = AnswerGenerator::new(mock.clone(), 0.5);
        let context = vec![retrieved(0, "a", 0.4), retrieved(1, "b", 0.1)];
        let answer = generator.generate("q", context).await.unwrap();
        assert!(!answer.grounded);
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_grounded_answer_is_trimmed() {
        let mock = Arc::new(MockCompletionProvider::new("  Blue.\n"));
        let generator = AnswerGenerator::new(mock.clone(), 0.05).with_temperature(0.2);
        let answer = generator.generate("q", vec![retrieved(0, "sky is blue", 0.7)]).await.unwrap();
        assert_eq!(answer.text, "Blue.");
        assert!(answer.grounded);
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_request().unwrap().temperature, 0.2);
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let mock = Arc::new(MockCompletionProvider::failing("503"));
        let generator = AnswerGenerator::new(mock, 0.05);
        let err = generator.generate("q", vec![retrieved(0, "x", 0.9)]).await.unwrap_err();
        assert!(matches!(err, RagError::UpstreamError { .. }));
    }
}
