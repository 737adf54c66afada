//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`]: fixed windows of Unicode scalar values with overlap (the default)
//! - [`WordChunker`]: fixed windows of whitespace-separated words with overlap
//!
//! Both produce lazy iterators that are `Clone`, so a chunk sequence can be
//! restarted without re-reading the document.

use std::iter::FusedIterator;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::Chunk;

/// A strategy for splitting document text into overlapping chunks.
///
/// Implementations must be deterministic: the same text always yields the
/// same chunk sequence.
pub trait Chunker: Send + Sync {
    /// Lazily split `text` into chunks.
    ///
    /// Yields nothing for empty text.
    fn chunks<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = Chunk> + 'a>;
}

/// The unit in which chunk size and overlap are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkUnit {
    /// Unicode scalar values (`char`s).
    #[default]
    Chars,
    /// Whitespace-separated words, re-joined with single spaces.
    Words,
}

impl ChunkUnit {
    /// Build the chunker for this unit. Parameters are assumed validated.
    pub fn chunker(self, chunk_size: usize, chunk_overlap: usize) -> Arc<dyn Chunker> {
        match self {
            Self::Chars => Arc::new(FixedSizeChunker::new(chunk_size, chunk_overlap)),
            Self::Words => Arc::new(WordChunker::new(chunk_size, chunk_overlap)),
        }
    }
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
///
/// Chunk *i* covers characters `[i * (size - overlap), i * (size - overlap) + size)`
/// clipped to the text length. The sequence stops at the first chunk that
/// reaches the end of the text, so text no longer than `size` yields exactly
/// one chunk.
///
/// # Example
///
/// ```rust
/// use docqa_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(4, 1);
/// let texts: Vec<String> = chunker.iter("abcdefghij").map(|c| c.text).collect();
/// assert_eq!(texts, ["abcd", "defg", "ghij"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of characters shared by consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Distance in characters between the starts of consecutive chunks.
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap).max(1)
    }

    /// Lazily iterate over the chunks of `text`.
    pub fn iter<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            chunk_size: self.chunk_size.max(1),
            step: self.step(),
            index: 0,
            byte_pos: 0,
            char_pos: 0,
            done: text.is_empty(),
        }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunks<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = Chunk> + 'a> {
        Box::new(self.iter(text))
    }
}

/// Iterator over the character chunks of one text. See [`FixedSizeChunker`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    chunk_size: usize,
    step: usize,
    index: usize,
    byte_pos: usize,
    char_pos: usize,
    done: bool,
}

impl Chunks<'_> {
    /// Byte offset `n` characters after `self.byte_pos`, clipped to the text end.
    fn advance(&self, n: usize) -> usize {
        self.text[self.byte_pos..]
            .char_indices()
            .nth(n)
            .map_or(self.text.len(), |(offset, _)| self.byte_pos + offset)
    }
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }

        let end = self.advance(self.chunk_size);
        let chunk = Chunk {
            index: self.index,
            start: self.char_pos,
            text: self.text[self.byte_pos..end].to_string(),
        };

        if end >= self.text.len() {
            self.done = true;
        } else {
            self.byte_pos = self.advance(self.step);
            self.char_pos += self.step;
            self.index += 1;
        }

        Some(chunk)
    }
}

impl FusedIterator for Chunks<'_> {}

/// Splits text into windows of whitespace-separated words.
///
/// Words inside a chunk are joined by a single space, so original spacing
/// and line breaks are not preserved. `Chunk::start` is a word offset.
#[derive(Debug, Clone, Copy)]
pub struct WordChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl WordChunker {
    /// Create a new `WordChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of words per chunk
    /// * `chunk_overlap` — number of words shared by consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Lazily iterate over the word chunks of `text`.
    pub fn iter<'a>(&self, text: &'a str) -> WordChunks<'a> {
        let words: Vec<&str> = text.split_whitespace().collect();
        WordChunks {
            done: words.is_empty(),
            words,
            chunk_size: self.chunk_size.max(1),
            step: self.chunk_size.saturating_sub(self.chunk_overlap).max(1),
            index: 0,
        }
    }
}

impl Chunker for WordChunker {
    fn chunks<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = Chunk> + 'a> {
        Box::new(self.iter(text))
    }
}

/// Iterator over the word chunks of one text. See [`WordChunker`].
#[derive(Debug, Clone)]
pub struct WordChunks<'a> {
    words: Vec<&'a str>,
    chunk_size: usize,
    step: usize,
    index: usize,
    done: bool,
}

impl Iterator for WordChunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }

        let start = self.index * self.step;
        let end = (start + self.chunk_size).min(self.words.len());
        let chunk = Chunk { index: self.index, start, text: self.words[start..end].join(" ") };

        if end >= self.words.len() {
            self.done = true;
        } else {
            self.index += 1;
        }

        Some(chunk)
    }
}

impl FusedIterator for WordChunks<'_> {}
