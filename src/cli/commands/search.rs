//! Search command: rank document chunks against a query.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};

use crate::config::Settings;
use crate::pipeline::RagPipeline;

const PREVIEW_CHARS: usize = 80;

/// Run search command.
pub fn run(
    settings: &Settings,
    document: &Path,
    query: &str,
    top_k: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut pipeline = RagPipeline::from_settings(settings)?;
    pipeline
        .load_document(document)
        .with_context(|| format!("failed to load {}", document.display()))?;

    let top_k = top_k.unwrap_or(pipeline.options().top_k);
    let results = pipeline.relevant_chunks(query, top_k)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        eprintln!("No results found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rank", "Score", "Chunk", "Chars", "Preview"]);
    for (i, result) in results.iter().enumerate() {
        let (start, end) = result.chunk.char_range;
        table.add_row(vec![
            (i + 1).to_string(),
            format!("{:.3}", result.similarity),
            result.chunk.id.to_string(),
            format!("{start}..{end}"),
            result.chunk.preview(PREVIEW_CHARS).replace('\n', " "),
        ]);
    }
    println!("{table}");
    Ok(())
}
