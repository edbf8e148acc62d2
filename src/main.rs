use anyhow::Result;
use clap::Parser;
use minirag::cli::{Cli, commands};
use minirag::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = commands::load_settings(&cli)?;
    logging::init_with_config(&settings.logging);

    tracing::debug!(target: "cli", "running {:?}", cli.command);
    commands::dispatch(cli.command, &settings)
}
