//! # Coalesced
//!
//! A pure-Rust codec for Unreal Engine 3 "Coalesced" localization bundles:
//! big-endian archives of UTF-16 INI files.
//!
//! ## Quick Start
//!
//! ### Unpacking and repacking
//!
//! ```no_run
//! use coalesced::operations::CoalescedOperations;
//!
//! // Coalesced_INT.bin -> Coalesced_INT/ (one INI file per entry)
//! let result = CoalescedOperations::unpack("Coalesced_INT.bin")?;
//! println!("Wrote {} files", result.files.len());
//!
//! // Coalesced_INT/ -> Coalesced_INT.BIN
//! CoalescedOperations::repack("Coalesced_INT")?;
//! # Ok::<(), coalesced::Error>(())
//! ```
//!
//! ### Working with the entry tree
//!
//! ```
//! use coalesced::prelude::*;
//!
//! let archive = CoalescedArchive {
//!     entries: vec![Entry::new("Config\\Game.ini")
//!         .with_section(Section::new("Engine").with_record("bEnabled", "True"))],
//! };
//!
//! let bytes = serialize_coalesced(&archive, PathConvention::EngineRelative)?;
//! assert_eq!(parse_coalesced_bytes(&bytes)?, archive);
//! assert_eq!(render_ini(&archive.entries[0]), "[Engine]\nbEnabled=True\n");
//! # Ok::<(), coalesced::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `coalesced` command-line binary

pub mod error;
pub mod formats;
pub mod operations;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Field, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Field, Result};
    pub use crate::formats::coalesced::{
        CoalescedArchive, CoalescedReader, CoalescedWriter, Entry, LengthField, LengthStyle,
        PathConvention, Record, Section, parse_coalesced_bytes, parse_ini, probe_coalesced,
        read_coalesced, render_ini, serialize_coalesced, write_coalesced,
    };
    pub use crate::operations::{
        CoalescedOperations, CoalescedPhase, CoalescedProgress, EntrySummary, RepackOptions,
        UnpackOptions,
    };
    pub use crate::utils::{entry_output_path, normalize_entry_path};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
