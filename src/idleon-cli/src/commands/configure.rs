//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up idleon-export defaults.

use anyhow::Result;
use std::path::PathBuf;

use idleon::Format;

use crate::config::Config;

/// Handle the configure command
pub fn handle(
    workdir: Option<PathBuf>,
    format: Option<Format>,
    reference: Option<PathBuf>,
    show: bool,
) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if workdir.is_none() && format.is_none() && reference.is_none() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, workdir, format, reference);
    config.save()?;

    println!("Configuration updated");
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

fn apply(
    config: &mut Config,
    workdir: Option<PathBuf>,
    format: Option<Format>,
    reference: Option<PathBuf>,
) {
    if let Some(dir) = workdir {
        config.workdir = Some(dir);
    }
    if let Some(format) = format {
        config.set_format(format);
    }
    if let Some(dir) = reference {
        config.reference = Some(dir);
    }
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.workdir {
        Some(dir) => println!("Work directory: {}", dir.display()),
        None => println!("Work directory: (current directory)"),
    }
    println!(
        "Format: {}",
        config.format.as_deref().unwrap_or(Format::default().as_str())
    );
    match &config.reference {
        Some(dir) => println!("Reference tables: {}", dir.display()),
        None => println!("Reference tables: (bundled)"),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: idleon-export configure --workdir DIR");
    println!("   or: idleon-export configure --to cogstruction");
    println!("   or: idleon-export configure --reference DIR");
    println!("   or: idleon-export configure --show");
}
