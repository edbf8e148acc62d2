//! Core types for document chunks and their embeddings.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Embedding vector produced by an embedding service.
pub type Embedding = Vec<f32>;

/// Sequence identifier for a chunk, assigned in document order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(NonZeroU32);

impl ChunkId {
    /// Create a ChunkId from a u32, returning None if zero.
    pub fn from_u32(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    /// Id for the chunk at a zero-based position.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .and_then(Self::from_u32)
    }

    /// Get the inner value as u32.
    pub fn value(&self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A window of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequence identifier.
    pub id: ChunkId,

    /// Character range in the source document (start, end).
    pub char_range: (usize, usize),

    /// The text content of this chunk.
    pub text: String,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(id: ChunkId, char_range: (usize, usize), text: String) -> Self {
        Self {
            id,
            char_range,
            text,
        }
    }

    /// Get character count.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Get a preview of the content (first N characters).
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }
}
