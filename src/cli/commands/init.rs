//! Init and Config commands.

use anyhow::{Context, Result, anyhow};

use crate::config::Settings;

/// Run init command - create configuration file.
pub fn run_init(force: bool) -> Result<()> {
    let dir = std::env::current_dir().context("cannot determine current directory")?;
    let path = Settings::init_config_file(&dir, force).map_err(|e| anyhow!("{e}"))?;

    if force {
        println!("Wrote configuration file at: {}", path.display());
    } else {
        println!("Created configuration file at: {}", path.display());
    }
    println!("Edit this file to customize your settings.");
    Ok(())
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) -> Result<()> {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    let toml_str = config.to_toml().context("failed to render settings")?;
    println!("{toml_str}");
    Ok(())
}
