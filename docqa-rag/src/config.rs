//! Configuration for the RAG session and the completion endpoint.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chunking::ChunkUnit;
use crate::error::{RagError, Result};

/// Environment variable holding the completion API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Default OpenAI-compatible base URL (Groq).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Configuration parameters for chunking, retrieval, and the fallback policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size, in `chunk_unit`s.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in `chunk_unit`s.
    pub chunk_overlap: usize,
    /// Unit for `chunk_size` and `chunk_overlap`.
    pub chunk_unit: ChunkUnit,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Below this similarity a retrieved chunk does not count as relevant.
    /// If no chunk reaches it, the fallback answer is returned.
    pub min_relevance: f32,
    /// Drop English stop words before TF-IDF weighting.
    pub remove_stop_words: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 150,
            chunk_unit: ChunkUnit::Chars,
            top_k: 3,
            min_relevance: 0.05,
            remove_stop_words: true,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `min_relevance` is outside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_relevance) {
            return Err(RagError::ConfigError(format!(
                "min_relevance ({}) must be within [0, 1]",
                self.min_relevance
            )));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the unit chunk size and overlap are measured in.
    pub fn chunk_unit(mut self, unit: ChunkUnit) -> Self {
        self.config.chunk_unit = unit;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum relevance score below which the fallback applies.
    pub fn min_relevance(mut self, threshold: f32) -> Self {
        self.config.min_relevance = threshold;
        self
    }

    /// Enable or disable English stop-word removal.
    pub fn remove_stop_words(mut self, remove: bool) -> Self {
        self.config.remove_stop_words = remove;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Connection settings for an OpenAI-compatible chat-completion endpoint.
///
/// The API key is supplied at runtime and never written anywhere; `Debug`
/// output redacts it.
#[derive(Clone, PartialEq)]
pub struct LlmConfig {
    /// Bearer token for the endpoint.
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Optional cap on generated tokens.
    pub max_tokens: Option<u32>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl LlmConfig {
    /// Create a config with the given key and default endpoint settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Create a config using the [`API_KEY_ENV`] environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                RagError::ConfigError(format!("{API_KEY_ENV} environment variable not set"))
            })?;
        Ok(Self::new(api_key))
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the generated-token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RagConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_overlap_not_below_size() {
        let err = RagConfig::builder().chunk_size(10).chunk_overlap(10).build().unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }

    #[test]
    fn test_builder_rejects_zero_values() {
        assert!(RagConfig::builder().chunk_size(0).chunk_overlap(0).build().is_err());
        assert!(RagConfig::builder().top_k(0).build().is_err());
        assert!(RagConfig::builder().min_relevance(1.5).build().is_err());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = RagConfig::builder()
            .chunk_size(20)
            .chunk_overlap(5)
            .chunk_unit(ChunkUnit::Words)
            .top_k(4)
            .min_relevance(0.2)
            .remove_stop_words(false)
            .build()
            .unwrap();
        assert_eq!(config.chunk_size, 20);
        assert_eq!(config.chunk_overlap, 5);
        assert_eq!(config.chunk_unit, ChunkUnit::Words);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.min_relevance, 0.2);
        assert!(!config.remove_stop_words);
    }

    #[test]
    fn test_llm_config_overrides() {
        let config = LlmConfig::new("k")
            .with_model("m")
            .with_base_url("http://localhost/v1")
            .with_max_tokens(128)
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.model, "m");
        assert_eq!(config.base_url, "http://localhost/v1");
        assert_eq!(config.max_tokens, Some(128));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_llm_debug_redacts_key() {
        let config = LlmConfig::new("gsk_secret").with_model("m");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("gsk_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
