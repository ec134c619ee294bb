//! Export command handler

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use idleon::{Exporter, Format, LocalSave, ReferenceData, SaveData};

use crate::cli::ExportArgs;
use crate::config::Config;

const DEFAULT_INFILE: &str = "decoded.json";

/// Export settings after applying config defaults
#[derive(Debug, PartialEq)]
pub struct Settings {
    pub infile: PathBuf,
    pub workdir: PathBuf,
    pub format: Format,
    pub reference: Option<PathBuf>,
}

/// Command-line flags win over the config file, which wins over built-in defaults
pub fn resolve(args: ExportArgs, config: &Config) -> Result<Settings> {
    let workdir = args
        .workdir
        .or_else(|| config.workdir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let format = match args.to {
        Some(format) => format,
        None => config.get_format()?.unwrap_or_default(),
    };

    let infile = workdir.join(args.infile.unwrap_or_else(|| PathBuf::from(DEFAULT_INFILE)));

    Ok(Settings {
        infile,
        workdir,
        format,
        reference: args.reference.or_else(|| config.reference.clone()),
    })
}

/// Handle `export` command
pub fn handle(args: ExportArgs) -> Result<()> {
    let config = Config::load()?;
    let settings = resolve(args, &config)?;

    for path in run(&settings)? {
        println!("{}", path.display());
    }

    Ok(())
}

/// Read the save, build the requested format and write it; returns the written files
pub fn run(settings: &Settings) -> Result<Vec<PathBuf>> {
    let reference = match &settings.reference {
        Some(dir) => ReferenceData::from_dir(dir)
            .with_context(|| format!("Failed to load reference tables from {}", dir.display()))?,
        None => ReferenceData::bundled().context("Failed to load bundled reference tables")?,
    };

    let save = SaveData::from_path(&settings.infile)
        .with_context(|| format!("Failed to load save data from {}", settings.infile.display()))?;

    info!(
        "Exporting {} as {}",
        settings.infile.display(),
        settings.format
    );

    let exporter =
        Exporter::new(&LocalSave::new(save), &reference).context("Failed to read save data")?;

    exporter
        .export(settings.format, &settings.workdir)
        .with_context(|| format!("Failed to export {}", settings.format))
}
