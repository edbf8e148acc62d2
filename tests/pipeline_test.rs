//! End-to-end pipeline tests against deterministic fake services.

use std::cell::RefCell;
use std::rc::Rc;

use minirag::pipeline::build_prompt;
use minirag::providers::{EmbeddingService, GenerationRequest, GenerationService, ProviderError};
use minirag::{
    Chunk, ChunkId, Chunker, ChunkingConfig, DuplicatePolicy, PipelineOptions, RagError,
    RagPipeline, RagResult,
};
use tempfile::TempDir;

const MESSI: &str =
    "Lionel Messi won the Ballon d'Or eight times. He played for Barcelona and Argentina.";

/// Counts keyword occurrences: one dimension per keyword.
struct KeywordEmbedder {
    keywords: Vec<&'static str>,
    calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl KeywordEmbedder {
    fn new(keywords: &[&'static str]) -> (Self, Rc<RefCell<Vec<Vec<String>>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let embedder = Self {
            keywords: keywords.to_vec(),
            calls: Rc::clone(&calls),
        };
        (embedder, calls)
    }
}

impl EmbeddingService for KeywordEmbedder {
    fn model(&self) -> &str {
        "keyword-test"
    }

    fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.calls
            .borrow_mut()
            .push(inputs.iter().map(|s| s.to_string()).collect());
        Ok(inputs
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                self.keywords
                    .iter()
                    .map(|kw| lower.matches(kw).count() as f32)
                    .collect()
            })
            .collect())
    }
}

/// Returns the prompt it was given.
struct EchoGenerator {
    prompts: Rc<RefCell<Vec<String>>>,
}

impl EchoGenerator {
    fn new() -> (Self, Rc<RefCell<Vec<String>>>) {
        let prompts = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                prompts: Rc::clone(&prompts),
            },
            prompts,
        )
    }
}

impl GenerationService for EchoGenerator {
    fn model(&self) -> &str {
        "echo-test"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError> {
        self.prompts.borrow_mut().push(request.prompt.to_string());
        Ok(request.prompt.to_string())
    }
}

struct FailingEmbedder;

impl EmbeddingService for FailingEmbedder {
    fn model(&self) -> &str {
        "failing"
    }

    fn embed(&self, _inputs: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Err(ProviderError::Status {
            service: "fake embeddings",
            status: 429,
            body: "rate limited".to_string(),
        })
    }
}

struct FailingGenerator;

impl GenerationService for FailingGenerator {
    fn model(&self) -> &str {
        "failing"
    }

    fn generate(&self, _request: &GenerationRequest<'_>) -> Result<String, ProviderError> {
        Err(ProviderError::Status {
            service: "fake chat",
            status: 401,
            body: "bad key".to_string(),
        })
    }
}

/// Drops the last vector of every batch.
struct ShortEmbedder;

impl EmbeddingService for ShortEmbedder {
    fn model(&self) -> &str {
        "short"
    }

    fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(inputs.iter().skip(1).map(|_| vec![1.0]).collect())
    }
}

/// One chunk per non-blank line, ignoring the window settings.
struct LineChunker;

impl Chunker for LineChunker {
    fn chunk(&self, content: &str, _config: &ChunkingConfig) -> RagResult<Vec<Chunk>> {
        let mut chunks = Vec::new();
        let mut start = 0;
        for line in content.split('\n') {
            let len = line.chars().count();
            if !line.trim().is_empty() {
                let id = ChunkId::from_index(chunks.len()).expect("chunk id overflow");
                chunks.push(Chunk::new(id, (start, start + len), line.to_string()));
            }
            start += len + 1;
        }
        Ok(chunks)
    }
}

fn options(chunk_chars: usize, overlap_chars: usize) -> PipelineOptions {
    PipelineOptions {
        chunking: ChunkingConfig {
            chunk_chars,
            overlap_chars,
        },
        duplicates: DuplicatePolicy::Keep,
        top_k: 5,
        subject: "Lionel Messi".to_string(),
    }
}

/// ASCII segment of exactly 100 chars starting with `word`.
fn segment(word: &str) -> String {
    let mut s = format!("{word} ");
    while s.len() < 100 {
        s.push('.');
    }
    s
}

#[test]
fn test_messi_single_chunk_end_to_end() {
    let (embedder, calls) = KeywordEmbedder::new(&["ballon", "messi", "barcelona"]);
    let (generator, prompts) = EchoGenerator::new();
    let mut pipeline =
        RagPipeline::new(Box::new(embedder), Box::new(generator), options(200, 50)).unwrap();

    assert_eq!(pipeline.load_text(MESSI).unwrap(), 1);
    assert_eq!(pipeline.store().entries()[0].chunk.text, MESSI);

    let question = "How many Ballon d'Or awards did Messi win?";
    let answer = pipeline.answer_question(question).unwrap();

    assert_eq!(answer.context.len(), 1);
    assert_eq!(answer.context[0].text, MESSI);
    assert!(answer.context[0].similarity > 0.0);
    assert_eq!(answer.text, build_prompt("Lionel Messi", MESSI, question));
    assert_eq!(prompts.borrow().len(), 1);

    // One batch for the document, one for the query.
    let calls = calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], vec![MESSI.to_string()]);
    assert_eq!(calls[1], vec![question.to_string()]);
}

#[test]
fn test_prompt_holds_context_in_rank_order() {
    let (embedder, _) = KeywordEmbedder::new(&["alpha", "beta", "gamma"]);
    let (generator, prompts) = EchoGenerator::new();
    let mut opts = options(100, 0);
    opts.top_k = 2;
    let mut pipeline = RagPipeline::new(Box::new(embedder), Box::new(generator), opts).unwrap();

    let text = [segment("alpha"), segment("beta"), segment("gamma")].concat();
    assert_eq!(pipeline.load_text(&text).unwrap(), 3);

    let question = "beta beta gamma?";
    let answer = pipeline.answer_question(question).unwrap();

    let ids: Vec<u32> = answer.context.iter().map(|c| c.id.value()).collect();
    assert_eq!(ids, vec![2, 3]);
    assert!(answer.context[0].similarity > answer.context[1].similarity);

    let expected_context = format!("{}\n{}", segment("beta"), segment("gamma"));
    let prompt = &prompts.borrow()[0];
    assert_eq!(prompt, &build_prompt("Lionel Messi", &expected_context, question));

    let context_at = prompt.find("Context:\n").unwrap();
    let beta_at = prompt.find(&segment("beta")).unwrap();
    let gamma_at = prompt.find(&segment("gamma")).unwrap();
    let question_at = prompt.find("Question: beta beta gamma?").unwrap();
    assert!(context_at < beta_at && beta_at < gamma_at && gamma_at < question_at);
    assert!(prompt.ends_with("Answer:"));
}

#[test]
fn test_top_k_larger_than_store_returns_all() {
    let (embedder, _) = KeywordEmbedder::new(&["alpha", "beta"]);
    let (generator, _) = EchoGenerator::new();
    let mut pipeline =
        RagPipeline::new(Box::new(embedder), Box::new(generator), options(100, 0)).unwrap();
    pipeline
        .load_text(&[segment("alpha"), segment("beta")].concat())
        .unwrap();

    let results = pipeline.relevant_chunks("alpha", 10).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.id.value(), 1);
    assert!(results[0].similarity >= results[1].similarity);
}

#[test]
fn test_document_without_chunks_still_answers() {
    let (embedder, calls) = KeywordEmbedder::new(&["messi"]);
    let (generator, prompts) = EchoGenerator::new();
    let mut pipeline =
        RagPipeline::new(Box::new(embedder), Box::new(generator), options(200, 50)).unwrap();

    assert_eq!(pipeline.load_text("Messi is short.").unwrap(), 0);
    assert!(pipeline.store().is_empty());
    // Nothing to embed during load.
    assert!(calls.borrow().is_empty());

    let answer = pipeline.answer_question("Who?").unwrap();
    assert!(answer.context.is_empty());
    assert_eq!(prompts.borrow()[0], build_prompt("Lionel Messi", "", "Who?"));
}

#[test]
fn test_load_document_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("messi.txt");
    std::fs::write(&path, MESSI).unwrap();

    let (embedder, _) = KeywordEmbedder::new(&["messi"]);
    let (generator, _) = EchoGenerator::new();
    let mut pipeline =
        RagPipeline::new(Box::new(embedder), Box::new(generator), options(200, 50)).unwrap();
    assert_eq!(pipeline.load_document(&path).unwrap(), 1);
}

#[test]
fn test_missing_document_fails_before_embedding() {
    let temp_dir = TempDir::new().unwrap();
    let (embedder, calls) = KeywordEmbedder::new(&["messi"]);
    let (generator, _) = EchoGenerator::new();
    let mut pipeline =
        RagPipeline::new(Box::new(embedder), Box::new(generator), options(200, 50)).unwrap();

    let err = pipeline
        .load_document(temp_dir.path().join("missing.txt"))
        .unwrap_err();
    assert!(matches!(err, RagError::Io { .. }));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_embedding_failure_propagates() {
    let (generator, prompts) = EchoGenerator::new();
    let mut pipeline =
        RagPipeline::new(Box::new(FailingEmbedder), Box::new(generator), options(200, 50)).unwrap();

    let err = pipeline.load_text(MESSI).unwrap_err();
    assert!(matches!(
        err,
        RagError::Embedding(ProviderError::Status { status: 429, .. })
    ));
    assert!(pipeline.store().is_empty());

    let err = pipeline.answer_question("Who?").unwrap_err();
    assert!(matches!(err, RagError::Embedding(_)));
    assert!(prompts.borrow().is_empty());
}

#[test]
fn test_generation_failure_propagates() {
    let (embedder, _) = KeywordEmbedder::new(&["messi"]);
    let mut pipeline =
        RagPipeline::new(Box::new(embedder), Box::new(FailingGenerator), options(200, 50)).unwrap();
    pipeline.load_text(MESSI).unwrap();

    let err = pipeline.answer_question("Who?").unwrap_err();
    assert!(matches!(
        err,
        RagError::Generation(ProviderError::Status { status: 401, .. })
    ));
}

#[test]
fn test_embedding_count_mismatch_is_an_error() {
    let (generator, _) = EchoGenerator::new();
    let mut pipeline =
        RagPipeline::new(Box::new(ShortEmbedder), Box::new(generator), options(100, 0)).unwrap();

    let err = pipeline
        .load_text(&[segment("a"), segment("b")].concat())
        .unwrap_err();
    assert!(matches!(
        err,
        RagError::EmbeddingCountMismatch {
            expected: 2,
            actual: 1
        }
    ));
}

#[test]
fn test_duplicate_chunks_follow_policy() {
    let text = "x".repeat(300);

    let (embedder, _) = KeywordEmbedder::new(&["x"]);
    let (generator, _) = EchoGenerator::new();
    let mut keep =
        RagPipeline::new(Box::new(embedder), Box::new(generator), options(100, 0)).unwrap();
    assert_eq!(keep.load_text(&text).unwrap(), 3);

    let (embedder, _) = KeywordEmbedder::new(&["x"]);
    let (generator, _) = EchoGenerator::new();
    let mut opts = options(100, 0);
    opts.duplicates = DuplicatePolicy::Overwrite;
    let mut overwrite = RagPipeline::new(Box::new(embedder), Box::new(generator), opts).unwrap();
    assert_eq!(overwrite.load_text(&text).unwrap(), 1);
    assert_eq!(overwrite.store().entries()[0].chunk.id.value(), 1);
}

#[test]
fn test_invalid_chunking_rejected_at_construction() {
    let (embedder, _) = KeywordEmbedder::new(&["x"]);
    let (generator, _) = EchoGenerator::new();
    let result = RagPipeline::new(Box::new(embedder), Box::new(generator), options(50, 50));
    assert!(matches!(result, Err(RagError::InvalidChunking { .. })));
}

#[test]
fn test_second_load_is_rejected() {
    let (embedder, calls) = KeywordEmbedder::new(&["alpha"]);
    let (generator, _) = EchoGenerator::new();
    let mut pipeline =
        RagPipeline::new(Box::new(embedder), Box::new(generator), options(100, 0)).unwrap();

    assert_eq!(pipeline.load_text(&segment("alpha")).unwrap(), 1);
    let err = pipeline.load_text(&segment("alpha")).unwrap_err();
    assert!(matches!(err, RagError::AlreadyLoaded { chunks: 1 }));

    // Rejected before chunking or embedding.
    assert_eq!(calls.borrow().len(), 1);
    let ids: Vec<u32> = pipeline
        .store()
        .entries()
        .iter()
        .map(|entry| entry.chunk.id.value())
        .collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn test_load_after_empty_document_is_allowed() {
    let (embedder, _) = KeywordEmbedder::new(&["messi"]);
    let (generator, _) = EchoGenerator::new();
    let mut pipeline =
        RagPipeline::new(Box::new(embedder), Box::new(generator), options(200, 50)).unwrap();

    assert_eq!(pipeline.load_text("too short").unwrap(), 0);
    assert_eq!(pipeline.load_text(MESSI).unwrap(), 1);
}

#[test]
fn test_custom_chunker_replaces_sliding_window() {
    let (embedder, calls) = KeywordEmbedder::new(&["messi", "barcelona"]);
    let (generator, prompts) = EchoGenerator::new();
    let mut pipeline =
        RagPipeline::new(Box::new(embedder), Box::new(generator), options(200, 50))
            .unwrap()
            .with_chunker(Box::new(LineChunker));

    let text = "Messi won eight Ballons d'Or.\n\nHe started at Barcelona.\n";
    assert_eq!(pipeline.load_text(text).unwrap(), 2);
    assert_eq!(
        calls.borrow()[0],
        vec!["Messi won eight Ballons d'Or.", "He started at Barcelona."]
    );
    let entries = pipeline.store().entries();
    assert_eq!(entries[0].chunk.id.value(), 1);
    assert_eq!(entries[1].chunk.id.value(), 2);
    assert_eq!(entries[1].chunk.char_range, (31, 55));

    let answer = pipeline.answer_question_with("Barcelona?", 1).unwrap();
    assert_eq!(answer.context[0].text, "He started at Barcelona.");
    assert!(prompts.borrow()[0].contains("Context:\nHe started at Barcelona.\n\n"));
}
