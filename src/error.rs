use std::path::PathBuf;

use thiserror::Error;

use crate::providers::ProviderError;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Failed to read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Invalid chunking parameters: overlap_chars ({overlap_chars}) must be less than chunk_chars ({chunk_chars})"
    )]
    InvalidChunking {
        chunk_chars: usize,
        overlap_chars: usize,
    },

    #[error("A document is already loaded ({chunks} chunks stored)")]
    AlreadyLoaded { chunks: usize },

    #[error("Embedding request failed: {0}")]
    Embedding(#[source] ProviderError),

    #[error("Generation request failed: {0}")]
    Generation(#[source] ProviderError),

    #[error("Embedding service returned {actual} vectors for {expected} inputs")]
    EmbeddingCountMismatch { expected: usize, actual: usize },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("API key not found: set the {var} environment variable")]
    MissingApiKey { var: String },

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

pub type RagResult<T> = Result<T, RagError>;
