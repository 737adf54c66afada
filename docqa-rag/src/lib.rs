//! # docqa-rag
//!
//! Question answering over a single uploaded document.
//!
//! ## Overview
//!
//! A document (`.txt` or `.pdf`) is split into overlapping chunks, a TF-IDF
//! vocabulary is fitted on those chunks, and an exact cosine index is built
//! over the chunk vectors. Each question is projected into the same space,
//! the top-k chunks are retrieved, and a chat-completion model is asked to
//! answer from them alone. When nothing relevant is retrieved, a fixed
//! fallback answer is returned without contacting the model.
//!
//! - [`loader`]: text and PDF extraction
//! - [`chunking`]: character and word window chunkers
//! - [`tfidf`], [`embedding`]: sparse vectors and the vectorizer seam
//! - [`inmemory`], [`vectorstore`]: exact nearest-neighbour search
//! - [`generator`], [`llm`]: prompt assembly and the completion seam
//! - [`session`]: the [`RagSession`] tying it together
//!
//! ## Features
//!
//! - `groq` (default): [`GroqClient`], an OpenAI-compatible HTTP client

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generator;
#[cfg(feature = "groq")]
pub mod groq;
pub mod inmemory;
pub mod llm;
pub mod loader;
pub mod mock;
pub mod session;
pub mod tfidf;
pub mod vectorstore;

pub use chunking::{ChunkUnit, Chunker, FixedSizeChunker, WordChunker};
pub use config::{LlmConfig, RagConfig, RagConfigBuilder};
pub use document::{Answer, Chunk, Document, IndexSummary, RetrievedChunk, Turn};
pub use embedding::{Embedder, SparseVector, Vectorizer};
pub use error::{RagError, Result};
pub use generator::{AnswerGenerator, FALLBACK_ANSWER};
#[cfg(feature = "groq")]
pub use groq::GroqClient;
pub use inmemory::FlatIndex;
pub use llm::{CompletionProvider, CompletionRequest};
pub use loader::{FileKind, load_document};
pub use mock::MockCompletionProvider;
pub use session::{RagSession, RagSessionBuilder};
pub use tfidf::{TfIdfModel, TfIdfVectorizer};
pub use vectorstore::VectorIndex;
