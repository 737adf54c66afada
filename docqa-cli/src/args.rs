//! Command-line arguments.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use docqa_rag::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use docqa_rag::{
    ChunkUnit, CompletionProvider, GroqClient, LlmConfig, MockCompletionProvider, RagConfig,
};

/// Reply used by `--mock`.
pub const MOCK_REPLY: &str = "(offline mock) Run without --mock to get a model answer.";

/// Ask questions about a text or PDF document.
#[derive(Parser)]
#[command(name = "docqa", version, about, long_about = None)]
pub struct Args {
    /// Document to index at startup (.txt or .pdf)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Chunk size, in --chunk-unit units
    #[arg(long, default_value_t = 800)]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks
    #[arg(long, default_value_t = 150)]
    pub chunk_overlap: usize,

    /// Unit for chunk size and overlap
    #[arg(long, value_enum, default_value_t = UnitArg::Chars)]
    pub chunk_unit: UnitArg,

    /// Chunks retrieved per question
    #[arg(long, default_value_t = 3)]
    pub top_k: usize,

    /// Minimum similarity for a chunk to count as relevant
    #[arg(long, default_value_t = 0.05)]
    pub min_relevance: f32,

    /// Keep English stop words when weighting terms
    #[arg(long)]
    pub keep_stop_words: bool,

    /// API key for the completion endpoint
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Chat model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// OpenAI-compatible base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Answer with a canned reply instead of calling the model
    #[arg(long)]
    pub mock: bool,
}

/// Command-line spelling of [`ChunkUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    Chars,
    Words,
}

impl From<UnitArg> for ChunkUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Chars => ChunkUnit::Chars,
            UnitArg::Words => ChunkUnit::Words,
        }
    }
}

impl Args {
    /// Validated session configuration.
    pub fn rag_config(&self) -> docqa_rag::Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .chunk_unit(self.chunk_unit.into())
            .top_k(self.top_k)
            .min_relevance(self.min_relevance)
            .remove_stop_words(!self.keep_stop_words)
            .build()
    }

    /// Endpoint settings, if an API key was given.
    pub fn llm_config(&self) -> Option<LlmConfig> {
        let api_key = self.api_key.as_deref().filter(|key| !key.trim().is_empty())?;
        Some(
            LlmConfig::new(api_key)
                .with_model(&self.model)
                .with_base_url(&self.base_url)
                .with_timeout(Duration::from_secs(self.timeout_secs)),
        )
    }

    /// The completion provider selected by the flags.
    pub fn completion_provider(&self) -> anyhow::Result<Arc<dyn CompletionProvider>> {
        if self.mock {
            return Ok(Arc::new(MockCompletionProvider::new(MOCK_REPLY)));
        }
        let config = self.llm_config().ok_or_else(|| {
            anyhow::anyhow!("no API key: pass --api-key, set GROQ_API_KEY, or use --mock")
        })?;
        Ok(Arc::new(GroqClient::new(config)?))
    }
}
