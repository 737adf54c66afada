//! Exact in-memory vector index using cosine similarity.
//!
//! [`FlatIndex`] scans every vector on each query. Document chunk sets are
//! small enough that an exact scan is the whole story: no approximate
//! structure, no tuning knobs.

use std::cmp::Ordering;

use crate::embedding::SparseVector;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// A flat, exact nearest-neighbour index over sparse vectors.
///
/// Vector `i` belongs to chunk `i`. The index is immutable once built.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    vectors: Vec<SparseVector>,
}

impl FlatIndex {
    /// Build an index from one vector per chunk, in chunk order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`] if `vectors` is empty.
    pub fn build(vectors: Vec<SparseVector>) -> Result<Self> {
        if vectors.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        Ok(Self { vectors })
    }

    /// The stored vector for a chunk.
    pub fn vector(&self, chunk_index: usize) -> Option<&SparseVector> {
        self.vectors.get(chunk_index)
    }
}

impl VectorIndex for FlatIndex {
    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn search(&self, query: &SparseVector, top_k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, vector)| (index, vector.cosine(query)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
        scored.truncate(top_k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(term: u32) -> SparseVector {
        SparseVector::from_entries(vec![(term, 1.0)])
    }

    #[test]
    fn test_empty_build_fails() {
        assert!(matches!(FlatIndex::build(Vec::new()), Err(RagError::EmptyIndex)));
    }

    #[test]
    fn test_ties_broken_by_chunk_index() {
        let index = FlatIndex::build(vec![unit(1), unit(0), unit(1), unit(0)]).unwrap();
        let hits = index.search(&unit(0), 4);
        assert_eq!(hits.iter().map(|(i, _)| *i).collect::<Vec<_>>(), [1, 3, 0, 2]);
        assert_eq!(hits[0].1, 1.0);
        assert_eq!(hits[2].1, 0.0);
    }

    #[test]
    fn test_top_k_bounds() {
        let index = FlatIndex::build(vec![unit(0), unit(1)]).unwrap();
        assert_eq!(index.search(&unit(0), 5).len(), 2);
        assert!(index.search(&unit(0), 0).is_empty());
        assert_eq!(index.len(), 2);
    }
}
