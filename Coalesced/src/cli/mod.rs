//! Coalesced CLI - Command-line interface for Coalesced bundle tools

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;
use tracing::Level;

#[derive(Parser)]
#[command(name = "coalesced")]
#[command(version, about = "Coalesced: unpack and repack UE3 Coalesced localization bundles", long_about = None)]
struct Cli {
    /// Log every field read and written
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Run the Coalesced CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    cli.command.execute()?;

    Ok(())
}
