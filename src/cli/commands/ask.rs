//! Ask command: load a document and answer a question about it.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::pipeline::RagPipeline;

/// Run ask command.
pub fn run(
    settings: &Settings,
    document: &Path,
    question: &str,
    top_k: Option<usize>,
    show_context: bool,
) -> Result<()> {
    let mut pipeline = RagPipeline::from_settings(settings)?;
    pipeline
        .load_document(document)
        .with_context(|| format!("failed to load {}", document.display()))?;

    let top_k = top_k.unwrap_or(pipeline.options().top_k);
    let answer = pipeline.answer_question_with(question, top_k)?;

    if show_context {
        println!("--- Retrieved Context ---");
        for chunk in &answer.context {
            println!("[{}] (score: {:.3})\n{}\n", chunk.id, chunk.similarity, chunk.text);
        }
    }

    println!("Question: {question}\n");
    println!("Answer: {}", answer.text);
    Ok(())
}
