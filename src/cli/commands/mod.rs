//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod ask;
pub mod chunk;
pub mod init;
pub mod search;

use anyhow::Result;

use super::args::{Cli, Commands};
use crate::config::Settings;

/// Load settings for the invocation, honouring `--config`.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}

/// Dispatch a parsed command.
pub fn dispatch(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Ask {
            document,
            question,
            top_k,
            show_context,
        } => ask::run(settings, &document, &question, top_k, show_context),
        Commands::Search {
            document,
            query,
            top_k,
            json,
        } => search::run(settings, &document, &query, top_k, json),
        Commands::Chunk { document, json } => chunk::run(settings, &document, json),
        Commands::Init { force } => init::run_init(force),
        Commands::Config => init::run_config(settings),
    }
}
