//! Document chunking and chunk storage.
//!
//! This module provides:
//! - Sliding-window chunking with configurable window and overlap
//! - Chunk identifiers and chunk/embedding pairing
//! - The in-memory store queried by the ranker

pub mod chunker;
pub mod config;
pub mod store;
pub mod types;

pub use chunker::{Chunker, MIN_CHUNK_CHARS, SlidingWindowChunker};
pub use config::{ChunkingConfig, DuplicatePolicy, StoreConfig};
pub use store::{ChunkStore, StoredChunk};
pub use types::{Chunk, ChunkId, Embedding};

use std::path::Path;

use crate::error::{RagError, RagResult};

/// Read a UTF-8 document fully into memory.
pub fn read_document(path: &Path) -> RagResult<String> {
    let text = std::fs::read_to_string(path).map_err(|source| RagError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        target: "documents",
        "read {} bytes from {}",
        text.len(),
        path.display()
    );
    Ok(text)
}
