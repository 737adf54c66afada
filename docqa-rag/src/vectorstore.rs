//! Vector index trait for nearest-neighbour search over chunk vectors.

use crate::embedding::SparseVector;

/// A search structure over one vector per chunk, addressed by chunk index.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{FlatIndex, VectorIndex};
///
/// let index = FlatIndex::build(vectors)?;
/// let hits = index.search(&query_vector, 3);
/// ```
pub trait VectorIndex: Send + Sync {
    /// Number of indexed vectors.
    fn len(&self) -> usize;

    /// `true` if nothing is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return up to `top_k` `(chunk_index, score)` pairs.
    ///
    /// Results are ordered by descending score, ties broken by ascending
    /// chunk index.
    fn search(&self, query: &SparseVector, top_k: usize) -> Vec<(usize, f32)>;
}
