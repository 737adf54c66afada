//! Sparse vectors and the embedding traits used to produce them.
//!
//! Embedding is split in two steps. A [`Vectorizer`] fits a vocabulary on one
//! document's chunk set and returns a fitted [`Embedder`]; the embedder then
//! projects chunk and query text into that fixed space. Swapping the
//! vectorizer changes the vector math without touching chunking or
//! generation.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A sparse vector of `(term_id, weight)` pairs sorted by ascending term id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    /// Build a vector from arbitrary entries.
    ///
    /// Entries are sorted by term id, duplicate ids are summed, and zero
    /// weights are dropped.
    pub fn from_entries(mut entries: Vec<(u32, f32)>) -> Self {
        entries.sort_by_key(|(term, _)| *term);
        let mut merged: Vec<(u32, f32)> = Vec::with_capacity(entries.len());
        for (term, weight) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == term => *acc += weight,
                _ => merged.push((term, weight)),
            }
        }
        merged.retain(|(_, weight)| *weight != 0.0);
        Self { entries: merged }
    }

    /// The non-zero entries, sorted by term id.
    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the vector has no non-zero entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Euclidean length.
    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Scale the vector to unit length. A zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            self.entries.iter_mut().for_each(|(_, w)| *w /= norm);
        }
    }

    /// Dot product, merging the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_term, a_weight) = self.entries[i];
            let (b_term, b_weight) = other.entries[j];
            match a_term.cmp(&b_term) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity, clamped to `[-1, 1]` against rounding. Returns 0.0
    /// if either vector has zero magnitude.
    pub fn cosine(&self, other: &SparseVector) -> f32 {
        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        (self.dot(other) / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

/// A fitted embedding model that projects text into a fixed vector space.
pub trait Embedder: Send + Sync {
    /// Project `text` into the fitted space.
    ///
    /// Terms outside the fitted vocabulary contribute nothing; text with no
    /// known terms yields an empty vector.
    fn embed(&self, text: &str) -> SparseVector;

    /// Project a batch of texts. The default calls [`embed`](Embedder::embed) for each.
    fn embed_batch(&self, texts: &[&str]) -> Vec<SparseVector> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Dimensionality of the space (the vocabulary size for term-based models).
    fn dimensions(&self) -> usize;
}

/// Fits an [`Embedder`] on a corpus.
///
/// The vocabulary is derived from the given corpus only and is never shared
/// between fits.
pub trait Vectorizer: Send + Sync {
    /// Fit a new embedder on `corpus`.
    fn fit(&self, corpus: &[&str]) -> Result<Box<dyn Embedder>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entries_sorts_merges_and_drops_zeros() {
        let v = SparseVector::from_entries(vec![(3, 1.0), (1, 2.0), (3, 0.5), (2, 0.0)]);
        assert_eq!(v.entries(), &[(1, 2.0), (3, 1.5)]);
    }

    #[test]
    fn test_dot_and_cosine() {
        let a = SparseVector::from_entries(vec![(0, 1.0), (2, 1.0)]);
        let b = SparseVector::from_entries(vec![(2, 1.0), (5, 1.0)]);
        assert_eq!(a.dot(&b), 1.0);
        assert!((a.cosine(&b) - 0.5).abs() < 1e-6);
        assert_eq!(a.cosine(&SparseVector::default()), 0.0);
    }

    #[test]
    fn test_cosine_with_itself_stays_in_range() {
        let mut v = SparseVector::from_entries(vec![(0, 0.1), (3, 0.7), (4, 0.3), (9, 1.9)]);
        v.normalize();
        let score = v.cosine(&v.clone());
        assert!(score <= 1.0);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize() {
        let mut v = SparseVector::from_entries(vec![(0, 3.0), (1, 4.0)]);
        v.normalize();
        assert!((v.norm() - 1.0).abs() < 1e-6);
        let mut zero = SparseVector::default();
        zero.normalize();
        assert!(zero.is_empty());
    }
}
