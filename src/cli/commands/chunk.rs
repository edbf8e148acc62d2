//! Chunk command: show how a document is split, without embedding it.

use std::path::Path;

use anyhow::Result;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};

use crate::config::Settings;
use crate::documents::{self, Chunker, SlidingWindowChunker};

const PREVIEW_CHARS: usize = 60;

/// Run chunk command.
pub fn run(settings: &Settings, document: &Path, json: bool) -> Result<()> {
    let text = documents::read_document(document)?;
    let chunks = SlidingWindowChunker::new().chunk(&text, &settings.chunking)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Chunk", "Chars", "Length", "Preview"]);
    for chunk in &chunks {
        let (start, end) = chunk.char_range;
        table.add_row(vec![
            chunk.id.to_string(),
            format!("{start}..{end}"),
            chunk.char_count().to_string(),
            chunk.preview(PREVIEW_CHARS).replace('\n', " "),
        ]);
    }
    println!("{table}");
    println!(
        "{} chunks (window {}, overlap {})",
        chunks.len(),
        settings.chunking.chunk_chars,
        settings.chunking.overlap_chars
    );
    Ok(())
}
