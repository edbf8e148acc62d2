//! External embedding and generation services.
//!
//! The pipeline talks to both services through the narrow traits below, so the
//! HTTP clients in [`openai`] can be swapped for deterministic fakes.

pub mod openai;

pub use openai::{OpenAiChat, OpenAiEmbedder};

use thiserror::Error;

use crate::documents::Embedding;

/// Error type for external service calls.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid API key")]
    InvalidApiKey,

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to parse {service} response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Embedding service: one vector per input string, in input order.
pub trait EmbeddingService {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Embed a batch of strings.
    fn embed(&self, inputs: &[&str]) -> Result<Vec<Embedding>, ProviderError>;
}

/// Text-generation service.
pub trait GenerationService {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Send one user message and return the generated text.
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError>;
}

/// Request envelope for a generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
}

/// Secret used to authenticate against the services. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for building request headers only.
    pub fn expose(&self) -> &str {
        self.0.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}
