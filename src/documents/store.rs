//! In-memory chunk store.
//!
//! Holds each chunk together with its embedding. The store is owned by the
//! pipeline, filled by a single document load and read by every query.

use super::config::DuplicatePolicy;
use super::types::{Chunk, Embedding};
use crate::error::{RagError, RagResult};

/// A chunk and its embedding.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub chunk: Chunk,
    pub embedding: Embedding,
}

/// Chunk/embedding entries in insertion order.
#[derive(Debug, Default)]
pub struct ChunkStore {
    entries: Vec<StoredChunk>,
    dimension: Option<usize>,
    policy: DuplicatePolicy,
}

impl ChunkStore {
    /// Create an empty store.
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            entries: Vec::new(),
            dimension: None,
            policy,
        }
    }

    /// Insert a chunk with its embedding.
    ///
    /// The first embedding fixes the store dimension; later embeddings must match it.
    pub fn insert(&mut self, chunk: Chunk, embedding: Embedding) -> RagResult<()> {
        match self.dimension {
            Some(expected) if expected != embedding.len() => {
                return Err(RagError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
            Some(_) => {}
            None => self.dimension = Some(embedding.len()),
        }

        if self.policy == DuplicatePolicy::Overwrite {
            if let Some(existing) = self
                .entries
                .iter_mut()
                .find(|entry| entry.chunk.text == chunk.text)
            {
                tracing::debug!(
                    target: "store",
                    "chunk {} duplicates chunk {}, replacing its embedding",
                    chunk.id,
                    existing.chunk.id
                );
                existing.embedding = embedding;
                return Ok(());
            }
        }

        self.entries.push(StoredChunk { chunk, embedding });
        Ok(())
    }

    /// Insert chunks paired with their embeddings, in order.
    pub fn extend(&mut self, chunks: Vec<Chunk>, embeddings: Vec<Embedding>) -> RagResult<()> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::EmbeddingCountMismatch {
                expected: chunks.len(),
                actual: embeddings.len(),
            });
        }
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            self.insert(chunk, embedding)?;
        }
        Ok(())
    }

    /// Stored entries in insertion order.
    pub fn entries(&self) -> &[StoredChunk] {
        &self.entries
    }

    /// Dimension of the stored embeddings, if any were inserted.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
