//! Document chunking strategies.
//!
//! Provides the `Chunker` trait and the sliding-window implementation used to
//! split a document into overlapping chunks suitable for embedding.

use super::config::ChunkingConfig;
use super::types::{Chunk, ChunkId};
use crate::error::RagResult;

/// Windows shorter than this many characters are never emitted.
pub const MIN_CHUNK_CHARS: usize = 50;

/// Trait for document chunking strategies.
pub trait Chunker: Send + Sync {
    /// Split document content into chunks.
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> RagResult<Vec<Chunk>>;
}

/// Fixed-width sliding window over characters.
///
/// Algorithm:
/// 1. Start at character offset 0
/// 2. Take `chunk_chars` characters (fewer at the end of the text)
/// 3. Drop the window if it is shorter than [`MIN_CHUNK_CHARS`]
/// 4. Advance by `chunk_chars - overlap_chars` until the offset reaches the end
///
/// Only the tail windows can fall below the minimum, so the last, short part
/// of a document is discarded rather than emitted.
#[derive(Debug, Default)]
pub struct SlidingWindowChunker;

impl SlidingWindowChunker {
    /// Create a new sliding-window chunker.
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for SlidingWindowChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> RagResult<Vec<Chunk>> {
        let step = config.step()?;

        // Byte offset of every character, plus the end of the string.
        let boundaries: Vec<usize> = content
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(content.len()))
            .collect();
        let total_chars = boundaries.len() - 1;

        let mut chunks = Vec::new();
        for start in (0..total_chars).step_by(step) {
            let end = (start + config.chunk_chars).min(total_chars);
            let len = end - start;
            if len < MIN_CHUNK_CHARS {
                tracing::debug!(
                    target: "chunker",
                    "dropping {len}-char window at offset {start} (minimum {MIN_CHUNK_CHARS})"
                );
                continue;
            }

            let Some(id) = ChunkId::from_index(chunks.len()) else {
                tracing::warn!(target: "chunker", "chunk id space exhausted at offset {start}");
                break;
            };
            let text = content[boundaries[start]..boundaries[end]].to_string();
            chunks.push(Chunk::new(id, (start, end), text));
        }

        tracing::debug!(
            target: "chunker",
            "split {total_chars} chars into {} chunks (window {}, step {step})",
            chunks.len(),
            config.chunk_chars
        );
        Ok(chunks)
    }
}
