use clap::Subcommand;
use std::path::PathBuf;

pub mod inspect;
pub mod repack;
pub mod unpack;

#[derive(Subcommand)]
pub enum Commands {
    /// Unpack a Coalesced archive into INI files
    Unpack {
        /// Source archive (e.g. Coalesced_INT.bin)
        #[arg(short, long)]
        source: PathBuf,

        /// Output directory (default: next to the source)
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// Write directly into the output directory instead of a subfolder named after the archive
        #[arg(long)]
        flat: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Repack a directory of INI files into a Coalesced archive
    Repack {
        /// Source directory
        #[arg(short, long)]
        source: PathBuf,

        /// Output archive (default: <source>.BIN next to the directory)
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// Store entry paths without the ..\..\ prefix
        #[arg(long)]
        bare_paths: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Check whether a file looks like a Coalesced archive
    Validate {
        /// File to check
        #[arg(short, long)]
        source: PathBuf,
    },

    /// List archive entries
    List {
        /// Source archive
        #[arg(short, long)]
        source: PathBuf,

        /// Show section and record counts
        #[arg(short, long)]
        detailed: bool,
    },

    /// Dump the decoded archive as JSON
    Dump {
        /// Source archive
        #[arg(short, long)]
        source: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        destination: Option<PathBuf>,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Unpack {
                source,
                destination,
                flat,
                quiet,
            } => unpack::execute(source, destination.as_deref(), *flat, !*quiet),
            Commands::Repack {
                source,
                destination,
                bare_paths,
                quiet,
            } => repack::execute(source, destination.as_deref(), *bare_paths, !*quiet),
            Commands::Validate { source } => inspect::validate(source),
            Commands::List { source, detailed } => inspect::list(source, *detailed),
            Commands::Dump {
                source,
                destination,
            } => inspect::dump(source, destination.as_deref()),
        }
    }
}
