pub mod cli;
pub mod config;
pub mod documents;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod providers;
pub mod semantic;

pub use config::Settings;
pub use documents::{
    Chunk, ChunkId, ChunkStore, Chunker, ChunkingConfig, DuplicatePolicy, SlidingWindowChunker,
};
pub use error::{RagError, RagResult};
pub use pipeline::{Answer, PipelineOptions, RagPipeline};
pub use providers::{ApiKey, EmbeddingService, GenerationRequest, GenerationService, ProviderError};
pub use semantic::{ScoredChunk, cosine_similarity, rank};
