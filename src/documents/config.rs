//! Configuration types for document chunking and chunk storage.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, RagResult};

/// Configuration for sliding-window chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window length in characters.
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,

    /// Characters shared between adjacent windows.
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,
}

fn default_chunk_chars() -> usize {
    200
}

fn default_overlap_chars() -> usize {
    50
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_chars: default_chunk_chars(),
            overlap_chars: default_overlap_chars(),
        }
    }
}

impl ChunkingConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> RagResult<()> {
        if self.overlap_chars >= self.chunk_chars {
            return Err(RagError::InvalidChunking {
                chunk_chars: self.chunk_chars,
                overlap_chars: self.overlap_chars,
            });
        }
        Ok(())
    }

    /// Distance between consecutive window starts.
    pub fn step(&self) -> RagResult<usize> {
        self.validate()?;
        Ok(self.chunk_chars - self.overlap_chars)
    }
}

/// Chunk store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How byte-identical chunks are stored.
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

/// Handling of chunks whose text is identical to an already stored chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Every chunk is a distinct entry, identified by its chunk id.
    #[default]
    Keep,
    /// Text is the key: a later identical chunk replaces the earlier vector in place.
    Overwrite,
}
