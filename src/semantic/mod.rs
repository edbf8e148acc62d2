//! Similarity ranking over the chunk store.
//!
//! Brute-force cosine similarity: every stored chunk is scored against the
//! query vector and the best `top_k` are returned.

use serde::Serialize;

use crate::documents::{Chunk, ChunkStore};
use crate::error::{RagError, RagResult};

/// A stored chunk with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub similarity: f32,
}

/// Calculate cosine similarity between two vectors.
///
/// Sums are accumulated in `f64` so very large or very small components do
/// not overflow or flush to zero. Returns 0.0 when either vector has zero
/// magnitude or the result is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (dot_product, norm_a, norm_b) = a.iter().zip(b.iter()).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = (dot_product / (norm_a.sqrt() * norm_b.sqrt())) as f32;
    if similarity.is_finite() { similarity } else { 0.0 }
}

/// Return the `top_k` stored chunks most similar to `query`, best first.
///
/// Ties keep store order. An empty store yields an empty result.
pub fn rank<'a>(
    store: &'a ChunkStore,
    query: &[f32],
    top_k: usize,
) -> RagResult<Vec<ScoredChunk<'a>>> {
    if let Some(expected) = store.dimension() {
        if expected != query.len() {
            return Err(RagError::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }
    }

    let mut scored: Vec<ScoredChunk<'a>> = store
        .entries()
        .iter()
        .map(|entry| ScoredChunk {
            chunk: &entry.chunk,
            similarity: cosine_similarity(query, &entry.embedding),
        })
        .collect();

    // Stable sort, so equal scores stay in store order.
    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(top_k);

    tracing::debug!(
        target: "ranker",
        "ranked {} chunks, returning {}",
        store.len(),
        scored.len()
    );
    Ok(scored)
}
