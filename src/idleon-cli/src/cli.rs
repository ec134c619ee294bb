//! CLI argument definitions for idleon-export

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use idleon::Format;

#[derive(Parser)]
#[command(name = "idleon-export")]
#[command(about = "Export decoded Legends of Idleon saves", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a decoded save into companion JSON or cog board tables
    #[command(visible_alias = "e")]
    Export(ExportArgs),

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set the default work directory
        #[arg(long)]
        workdir: Option<PathBuf>,

        /// Set the default output format
        #[arg(long, value_parser = parse_format)]
        to: Option<Format>,

        /// Set a reference table directory to use instead of the bundled tables
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Args)]
pub struct ExportArgs {
    /// Decoded save file, relative to the work directory (default: decoded.json)
    pub infile: Option<PathBuf>,

    /// Directory to read the save from and write output into
    #[arg(short, long, env = "IDLEON_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Output format: idleon_companion (default) or cogstruction
    #[arg(short, long, value_parser = parse_format)]
    pub to: Option<Format>,

    /// Reference table directory to use instead of the bundled tables
    #[arg(short, long)]
    pub reference: Option<PathBuf>,
}

/// Restrict the format flag to the known format names
pub fn parse_format(s: &str) -> Result<Format, String> {
    s.parse::<Format>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_defaults() {
        let cli = Cli::try_parse_from(["idleon-export", "export"]).unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert!(args.infile.is_none());
        assert!(args.to.is_none());
    }

    #[test]
    fn test_export_format_flag() {
        let cli = Cli::try_parse_from([
            "idleon-export",
            "export",
            "--to",
            "cogstruction",
            "save.json",
        ])
        .unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.to, Some(Format::Cogstruction));
        assert_eq!(args.infile, Some(PathBuf::from("save.json")));
    }

    #[test]
    fn test_export_rejects_unknown_format() {
        let result = Cli::try_parse_from(["idleon-export", "export", "--to", "xlsx"]);
        assert!(result.is_err());
    }
}
