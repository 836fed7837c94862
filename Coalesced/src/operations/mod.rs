//! Archive operations module
//!
//! [`CoalescedOperations`] is the entry point used by the CLI: it ties the
//! codec in [`crate::formats::coalesced`] to the file system.

mod repack;
mod types;
mod unpack;

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use crate::error::Result;
use crate::formats::coalesced::{
    CoalescedArchive, CoalescedReader, parse_coalesced_bytes, probe_coalesced,
};

pub use repack::{collect_entries, find_entry_files, repack_destination, repack_directory};
pub use types::{
    CoalescedPhase, CoalescedProgress, EntrySummary, ProgressCallback, RepackOptions,
    RepackResult, UnpackOptions, UnpackResult, ValidationInfo,
};
pub use unpack::{unpack_archive, unpack_destination, write_entry};

/// File-level operations on Coalesced archives
pub struct CoalescedOperations;

impl CoalescedOperations {
    /// Check whether a file looks like a Coalesced archive
    ///
    /// # Errors
    /// Returns [`crate::Error::NotCoalesced`] if the entry count heuristic fails.
    pub fn validate<P: AsRef<Path>>(path: P) -> Result<ValidationInfo> {
        let mut input = BufReader::new(File::open(path.as_ref())?);
        let entry_count = probe_coalesced(&mut input)?;

        let mut reader = CoalescedReader::new(input);
        reader.read_entry_count()?;
        let first_entry = reader.read_entry().ok().map(|entry| entry.path);

        Ok(ValidationInfo {
            entry_count,
            first_entry,
        })
    }

    /// Read and decode a whole archive, applying the format heuristic first
    pub fn read<P: AsRef<Path>>(path: P) -> Result<CoalescedArchive> {
        let data = std::fs::read(path.as_ref())?;
        probe_coalesced(&mut Cursor::new(data.as_slice()))?;
        parse_coalesced_bytes(&data)
    }

    /// List the entries of an archive
    pub fn list<P: AsRef<Path>>(path: P) -> Result<Vec<EntrySummary>> {
        let archive = Self::read(path)?;
        Ok(archive.entries.iter().map(EntrySummary::from).collect())
    }

    /// Decoded archive as pretty-printed JSON
    pub fn dump_json<P: AsRef<Path>>(path: P) -> Result<String> {
        let archive = Self::read(path)?;
        Ok(serde_json::to_string_pretty(&archive)?)
    }

    /// Unpack an archive next to itself (`<dir>/<stem>/`)
    pub fn unpack<P: AsRef<Path>>(archive: P) -> Result<UnpackResult> {
        unpack_archive(archive.as_ref(), None, &UnpackOptions::default(), &|_| {})
    }

    /// Unpack an archive under `output` with options
    pub fn unpack_to<P: AsRef<Path>, Q: AsRef<Path>>(
        archive: P,
        output: Q,
        options: &UnpackOptions,
    ) -> Result<UnpackResult> {
        unpack_archive(archive.as_ref(), Some(output.as_ref()), options, &|_| {})
    }

    /// Unpack with progress reporting
    pub fn unpack_with_progress<P: AsRef<Path>>(
        archive: P,
        output: Option<&Path>,
        options: &UnpackOptions,
        progress: ProgressCallback,
    ) -> Result<UnpackResult> {
        unpack_archive(archive.as_ref(), output, options, progress)
    }

    /// Repack a directory into `<dir>.BIN` next to it
    pub fn repack<P: AsRef<Path>>(input_dir: P) -> Result<RepackResult> {
        repack_directory(input_dir.as_ref(), None, &RepackOptions::default(), &|_| {})
    }

    /// Repack a directory into `output` with options
    pub fn repack_to<P: AsRef<Path>, Q: AsRef<Path>>(
        input_dir: P,
        output: Q,
        options: &RepackOptions,
    ) -> Result<RepackResult> {
        repack_directory(input_dir.as_ref(), Some(output.as_ref()), options, &|_| {})
    }

    /// Repack with progress reporting
    pub fn repack_with_progress<P: AsRef<Path>>(
        input_dir: P,
        output: Option<&Path>,
        options: &RepackOptions,
        progress: ProgressCallback,
    ) -> Result<RepackResult> {
        repack_directory(input_dir.as_ref(), output, options, progress)
    }
}
