//! Document question-answering session.
//!
//! A [`RagSession`] owns the index for the currently loaded document and
//! the in-memory chat transcript. It coordinates the build phase
//! (load → chunk → fit → index) and the query phase
//! (embed → search → generate).
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_rag::{FileKind, MockCompletionProvider, RagConfig, RagSession};
//!
//! let mut session = RagSession::builder()
//!     .config(RagConfig::default())
//!     .completion_provider(Arc::new(MockCompletionProvider::new("...")))
//!     .build()?;
//!
//! session.build_index(&bytes, FileKind::Text)?;
//! let answer = session.ask("What colour is the sky?").await?;
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::RagConfig;
use crate::document::{Answer, Chunk, Document, IndexSummary, RetrievedChunk, Turn};
use crate::embedding::{Embedder, Vectorizer};
use crate::error::{RagError, Result};
use crate::generator::AnswerGenerator;
use crate::inmemory::FlatIndex;
use crate::llm::CompletionProvider;
use crate::loader::{FileKind, load_document};
use crate::tfidf::TfIdfVectorizer;
use crate::vectorstore::VectorIndex;

/// Source name used when bytes arrive without a file name.
const UNNAMED_SOURCE: &str = "upload";

/// Everything derived from one document. Replaced wholesale on rebuild.
struct IndexedDocument {
    source_name: String,
    chunks: Vec<Chunk>,
    embedder: Box<dyn Embedder>,
    index: Box<dyn VectorIndex>,
}

/// A single-user question-answering session over one document at a time.
///
/// Construct one via [`RagSession::builder()`].
pub struct RagSession {
    config: RagConfig,
    vectorizer: Arc<dyn Vectorizer>,
    generator: AnswerGenerator,
    indexed: Option<IndexedDocument>,
    transcript: Vec<Turn>,
}

impl RagSession {
    /// Create a new [`RagSessionBuilder`].
    pub fn builder() -> RagSessionBuilder {
        RagSessionBuilder::default()
    }

    /// Return a reference to the session configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// `true` once an index has been built.
    pub fn is_ready(&self) -> bool {
        self.indexed.is_some()
    }

    /// Summary of the current index, if one exists.
    pub fn summary(&self) -> Option<IndexSummary> {
        self.indexed.as_ref().map(|indexed| IndexSummary {
            source_name: indexed.source_name.clone(),
            chunk_count: indexed.chunks.len(),
            vocabulary_size: indexed.embedder.dimensions(),
        })
    }

    /// Chunks of the current document, in sequence order.
    pub fn chunks(&self) -> &[Chunk] {
        self.indexed.as_ref().map(|indexed| indexed.chunks.as_slice()).unwrap_or_default()
    }

    /// Question/answer turns since the last build.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Forget the transcript, keeping the index.
    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    /// Build the index from raw bytes of the given kind.
    ///
    /// # Errors
    ///
    /// Returns the loader's, chunker's, or indexer's error, or
    /// [`RagError::IndexMismatch`] if the embedder does not return one vector
    /// per chunk. On error the previous index and transcript are left
    /// untouched.
    pub fn build_index(&mut self, bytes: &[u8], kind: FileKind) -> Result<IndexSummary> {
        let document = load_document(UNNAMED_SOURCE, bytes, kind)?;
        self.index_document(document)
    }

    /// Build the index from an uploaded file, resolving its kind from the name.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::UnsupportedFormat`] for anything but `.txt` and
    /// `.pdf`, otherwise as [`build_index`](Self::build_index).
    pub fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<IndexSummary> {
        let kind = FileKind::from_file_name(file_name).inspect_err(|e| {
            warn!(file_name, error = %e, "rejected upload");
        })?;
        let document = load_document(file_name, bytes, kind)?;
        self.index_document(document)
    }

    /// Build the index from text already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyDocument`] if `text` is blank.
    pub fn ingest_text(&mut self, text: &str, source_name: &str) -> Result<IndexSummary> {
        if text.trim().is_empty() {
            return Err(RagError::EmptyDocument);
        }
        self.index_document(Document::new(source_name, text))
    }

    fn index_document(&mut self, document: Document) -> Result<IndexSummary> {
        let chunker = self.config.chunk_unit.chunker(self.config.chunk_size, self.config.chunk_overlap);
        let chunks: Vec<Chunk> = chunker.chunks(&document.text).collect();
        if chunks.is_empty() {
            return Err(RagError::EmptyIndex);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embedder = self.vectorizer.fit(&texts)?;
        if embedder.dimensions() == 0 {
            warn!(source = %document.source_name, "document has no indexable terms");
        }
        let vectors = embedder.embed_batch(&texts);
        if vectors.len() != chunks.len() {
            return Err(RagError::IndexMismatch { chunks: chunks.len(), vectors: vectors.len() });
        }
        let index = FlatIndex::build(vectors)?;

        let indexed = IndexedDocument {
            source_name: document.source_name,
            chunks,
            embedder,
            index: Box::new(index),
        };
        let summary = IndexSummary {
            source_name: indexed.source_name.clone(),
            chunk_count: indexed.chunks.len(),
            vocabulary_size: indexed.embedder.dimensions(),
        };

        self.indexed = Some(indexed);
        self.transcript.clear();

        info!(
            source = %summary.source_name,
            chunk_count = summary.chunk_count,
            vocabulary_size = summary.vocabulary_size,
            "built index"
        );
        Ok(summary)
    }

    /// Return the `top_k` chunks most similar to `query`.
    ///
    /// Results are ordered by descending cosine similarity, ties by
    /// ascending chunk index. A query sharing no term with the document
    /// yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoIndexBuilt`] before the first successful build.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let indexed = self.indexed.as_ref().ok_or(RagError::NoIndexBuilt)?;

        let query_vector = indexed.embedder.embed(query);
        if query_vector.is_empty() {
            debug!("query has no in-vocabulary terms");
            return Ok(Vec::new());
        }

        let results: Vec<RetrievedChunk> = indexed
            .index
            .search(&query_vector, top_k)
            .into_iter()
            .filter_map(|(chunk_index, score)| {
                let chunk = indexed.chunks.get(chunk_index)?.clone();
                Some(RetrievedChunk { chunk, score })
            })
            .collect();

        debug!(top_k, result_count = results.len(), "retrieved context");
        Ok(results)
    }

    /// Answer `query` using the configured `top_k`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoIndexBuilt`] or a propagated
    /// [`RagError::UpstreamError`]. Either way the session stays usable.
    pub async fn ask(&mut self, query: &str) -> Result<Answer> {
        self.ask_with_top_k(query, self.config.top_k).await
    }

    /// Answer `query` retrieving `top_k` chunks.
    pub async fn ask_with_top_k(&mut self, query: &str, top_k: usize) -> Result<Answer> {
        let context = self.retrieve(query, top_k)?;
        let answer = self.generator.generate(query, context).await?;
        self.transcript.push(Turn { question: query.to_string(), answer: answer.clone() });
        Ok(answer)
    }
}

/// Builder for constructing a [`RagSession`].
///
/// The completion provider is required. The config defaults to
/// [`RagConfig::default()`] and the vectorizer to TF-IDF with the config's
/// stop-word setting.
#[derive(Default)]
pub struct RagSessionBuilder {
    config: Option<RagConfig>,
    vectorizer: Option<Arc<dyn Vectorizer>>,
    completion_provider: Option<Arc<dyn CompletionProvider>>,
    temperature: Option<f32>,
}

impl RagSessionBuilder {
    /// Set the session configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the default TF-IDF vectorizer.
    pub fn vectorizer(mut self, vectorizer: Arc<dyn Vectorizer>) -> Self {
        self.vectorizer = Some(vectorizer);
        self
    }

    /// Set the completion provider used for grounded answers.
    pub fn completion_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion_provider = Some(provider);
        self
    }

    /// Set the sampling temperature for completion requests.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build the [`RagSession`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the completion provider is
    /// missing or the config fails validation.
    pub fn build(self) -> Result<RagSession> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let provider = self
            .completion_provider
            .ok_or_else(|| RagError::ConfigError("completion_provider is required".to_string()))?;
        let vectorizer = self.vectorizer.unwrap_or_else(|| {
            Arc::new(TfIdfVectorizer::new().with_stop_words(config.remove_stop_words))
        });
        let generator = AnswerGenerator::new(provider, config.min_relevance)
            .with_temperature(self.temperature.unwrap_or(0.0));

        Ok(RagSession { config, vectorizer, generator, indexed: None, transcript: Vec::new() })
    }
}
