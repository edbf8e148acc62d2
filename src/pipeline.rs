//! RAG pipeline orchestrator.
//!
//! Coordinates chunking, embedding, storage, ranking and answer generation.
//! One pipeline owns one chunk store: load a document once, then ask any
//! number of questions against it.

use std::path::Path;

use serde::Serialize;

use crate::config::Settings;
use crate::documents::{
    self, ChunkId, ChunkStore, Chunker, ChunkingConfig, DuplicatePolicy, SlidingWindowChunker,
};
use crate::error::{RagError, RagResult};
use crate::providers::{
    EmbeddingService, GenerationRequest, GenerationService, OpenAiChat, OpenAiEmbedder,
};
use crate::semantic::{self, ScoredChunk};

/// Fill the answer prompt template.
pub fn build_prompt(subject: &str, context: &str, question: &str) -> String {
    format!(
        "Based on the following context about {subject}, please answer the question.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Answer:"
    )
}

/// Join ranked chunk texts into the prompt's context block.
pub fn render_context(chunks: &[ScoredChunk<'_>]) -> String {
    chunks
        .iter()
        .map(|scored| scored.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pipeline parameters that are not service clients.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub chunking: ChunkingConfig,
    pub duplicates: DuplicatePolicy,
    pub top_k: usize,
    pub subject: String,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            chunking: settings.chunking.clone(),
            duplicates: settings.store.duplicates,
            top_k: settings.retrieval.top_k,
            subject: settings.prompt.subject.clone(),
        }
    }
}

/// A chunk used as answer context.
#[derive(Debug, Clone, Serialize)]
pub struct ContextChunk {
    pub id: ChunkId,
    pub similarity: f32,
    pub text: String,
}

/// Generated answer with the context it was conditioned on.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub question: String,
    pub text: String,
    pub context: Vec<ContextChunk>,
}

/// RAG pipeline over a single document.
pub struct RagPipeline {
    embedder: Box<dyn EmbeddingService>,
    generator: Box<dyn GenerationService>,
    chunker: Box<dyn Chunker>,
    options: PipelineOptions,
    store: ChunkStore,
}

impl RagPipeline {
    /// Create a pipeline with an empty store.
    pub fn new(
        embedder: Box<dyn EmbeddingService>,
        generator: Box<dyn GenerationService>,
        options: PipelineOptions,
    ) -> RagResult<Self> {
        options.chunking.validate()?;
        Ok(Self {
            embedder,
            generator,
            chunker: Box::new(SlidingWindowChunker::new()),
            store: ChunkStore::new(options.duplicates),
            options,
        })
    }

    /// Create a pipeline backed by the OpenAI-compatible services in `settings`.
    pub fn from_settings(settings: &Settings) -> RagResult<Self> {
        let api_key = settings.api_key()?;
        let embedder =
            OpenAiEmbedder::new(&api_key, &settings.embedding).map_err(RagError::Embedding)?;
        let generator =
            OpenAiChat::new(&api_key, &settings.generation).map_err(RagError::Generation)?;
        Self::new(
            Box::new(embedder),
            Box::new(generator),
            PipelineOptions::from_settings(settings),
        )
    }

    /// Replace the chunking strategy.
    pub fn with_chunker(mut self, chunker: Box<dyn Chunker>) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Read, chunk and embed a document. Returns the number of stored chunks.
    pub fn load_document(&mut self, path: impl AsRef<Path>) -> RagResult<usize> {
        let text = documents::read_document(path.as_ref())?;
        self.load_text(&text)
    }

    /// Chunk and embed text held in memory. Returns the number of stored chunks.
    ///
    /// A pipeline holds one document; loading into a non-empty store is an error.
    pub fn load_text(&mut self, text: &str) -> RagResult<usize> {
        if !self.store.is_empty() {
            return Err(RagError::AlreadyLoaded {
                chunks: self.store.len(),
            });
        }
        let chunks = self.chunker.chunk(text, &self.options.chunking)?;
        if chunks.is_empty() {
            tracing::warn!(
                target: "pipeline",
                "document produced no chunks ({} chars); nothing to embed",
                text.chars().count()
            );
            return Ok(self.store.len());
        }

        let inputs: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        let embeddings = self.embedder.embed(&inputs).map_err(RagError::Embedding)?;
        self.store.extend(chunks, embeddings)?;

        tracing::info!(
            target: "pipeline",
            "stored {} chunks ({}d, model {})",
            self.store.len(),
            self.store.dimension().unwrap_or_default(),
            self.embedder.model()
        );
        Ok(self.store.len())
    }

    /// Embed the query and return the `top_k` most similar stored chunks.
    pub fn relevant_chunks(&self, query: &str, top_k: usize) -> RagResult<Vec<ScoredChunk<'_>>> {
        let mut vectors = self.embedder.embed(&[query]).map_err(RagError::Embedding)?;
        if vectors.len() != 1 {
            return Err(RagError::EmbeddingCountMismatch {
                expected: 1,
                actual: vectors.len(),
            });
        }
        let query_vector = vectors.remove(0);
        semantic::rank(&self.store, &query_vector, top_k)
    }

    /// Answer a question from the configured number of context chunks.
    pub fn answer_question(&self, question: &str) -> RagResult<Answer> {
        self.answer_question_with(question, self.options.top_k)
    }

    /// Answer a question from at most `top_k` context chunks.
    pub fn answer_question_with(&self, question: &str, top_k: usize) -> RagResult<Answer> {
        let relevant = self.relevant_chunks(question, top_k)?;
        if relevant.is_empty() {
            tracing::warn!(
                target: "pipeline",
                "no context chunks available; asking without context"
            );
        }

        let context = render_context(&relevant);
        let prompt = build_prompt(&self.options.subject, &context, question);
        tracing::debug!(
            target: "pipeline",
            "prompt built from {} chunks ({} chars), generating with {}",
            relevant.len(),
            prompt.chars().count(),
            self.generator.model()
        );
        let text = self
            .generator
            .generate(&GenerationRequest { prompt: &prompt })
            .map_err(RagError::Generation)?;

        Ok(Answer {
            question: question.to_string(),
            text,
            context: relevant
                .into_iter()
                .map(|scored| ContextChunk {
                    id: scored.chunk.id,
                    similarity: scored.similarity,
                    text: scored.chunk.text.clone(),
                })
                .collect(),
        })
    }
}
