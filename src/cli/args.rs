//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

pub const DEFAULT_DOCUMENT: &str = "messi.txt";
pub const DEFAULT_QUESTION: &str = "What are Messi's greatest achievements?";

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Retrieval-augmented question answering over a text document
#[derive(Parser, Debug)]
#[command(
    name = "minirag",
    version = env!("CARGO_PKG_VERSION"),
    about = "Answer questions about a text document with retrieval-augmented generation",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a document and answer one question about it
    Ask {
        /// Document to load
        #[arg(short, long, default_value = DEFAULT_DOCUMENT)]
        document: PathBuf,

        /// Question to answer
        #[arg(short, long, default_value = DEFAULT_QUESTION)]
        question: String,

        /// Number of context chunks (overrides config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the retrieved context before the answer
        #[arg(long)]
        show_context: bool,
    },

    /// Rank document chunks against a query without generating an answer
    Search {
        /// Document to load
        #[arg(short, long, default_value = DEFAULT_DOCUMENT)]
        document: PathBuf,

        /// Query text
        #[arg(short, long)]
        query: String,

        /// Number of results (overrides config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a document is chunked (no network access)
    Chunk {
        /// Document to chunk
        #[arg(short, long, default_value = DEFAULT_DOCUMENT)]
        document: PathBuf,

        /// Output chunks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create .minirag/settings.toml in the current directory
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Display active settings
    Config,
}
