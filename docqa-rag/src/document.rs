//! Data types for documents, chunks, retrieval results, and answers.

use serde::{Deserialize, Serialize};

/// Raw text extracted from one uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Display name of the source (file name or caller-supplied label).
    pub source_name: String,
    /// The extracted text content.
    pub text: String,
}

impl Document {
    /// Create a document from a source name and its text.
    pub fn new(source_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source_name: source_name.into(), text: text.into() }
    }
}

/// A contiguous, bounded-length passage of a [`Document`].
///
/// `start` is measured in the chunker's unit: Unicode scalar values for
/// character chunking, words for word chunking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position in the chunk sequence.
    pub index: usize,
    /// Offset of the chunk's first unit within the document.
    pub start: usize,
    /// The chunk text.
    pub text: String,
}

/// A retrieved [`Chunk`] paired with its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

/// The answer to one question together with the context that grounded it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The model reply, or the fixed fallback text.
    pub text: String,
    /// Retrieved context, ordered by descending score.
    pub sources: Vec<RetrievedChunk>,
    /// `false` when the fallback was returned without calling the model.
    pub grounded: bool,
}

/// One question/answer exchange in a session transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// The question as submitted.
    pub question: String,
    /// The answer returned for it.
    pub answer: Answer,
}

/// Summary of a freshly built index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexSummary {
    /// Name of the indexed source.
    pub source_name: String,
    /// Number of chunks (and vectors) in the index.
    pub chunk_count: usize,
    /// Number of distinct terms in the fitted vocabulary.
    pub vocabulary_size: usize,
}
