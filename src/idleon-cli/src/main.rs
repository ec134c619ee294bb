mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Export(args) => {
            commands::export::handle(args)?;
        }

        Commands::Configure {
            workdir,
            to,
            reference,
            show,
        } => {
            commands::configure::handle(workdir, to, reference, show)?;
        }
    }

    Ok(())
}

/// Log to stderr; RUST_LOG overrides the default level
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "idleon=debug,idleon_export=debug"
    } else {
        "idleon=info,idleon_export=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
