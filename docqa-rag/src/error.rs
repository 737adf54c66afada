//! Error types for the `docqa-rag` crate.

use thiserror::Error;

/// Errors that can occur while loading, indexing, or answering.
#[derive(Debug, Error)]
pub enum RagError {
    /// The uploaded file kind is neither plain text nor PDF.
    #[error("Unsupported format: '{0}' (expected .txt or .pdf)")]
    UnsupportedFormat(String),

    /// The bytes could not be decoded as the declared kind.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The extracted text is blank after trimming.
    #[error("Document is empty: no text could be extracted")]
    EmptyDocument,

    /// An index was requested over zero chunks.
    #[error("Cannot build an index from an empty chunk sequence")]
    EmptyIndex,

    /// The embedder returned a different number of vectors than there are chunks.
    #[error("Index mismatch: {chunks} chunks but {vectors} vectors")]
    IndexMismatch {
        /// Number of chunks produced by the chunker.
        chunks: usize,
        /// Number of vectors produced by the embedder.
        vectors: usize,
    },

    /// A query arrived before any index was built for the session.
    #[error("No index built: load a document first")]
    NoIndexBuilt,

    /// The remote completion endpoint failed or timed out.
    #[error("Upstream error ({provider}): {message}")]
    UpstreamError {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RagError {
    pub(crate) fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamError { provider: provider.into(), message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
