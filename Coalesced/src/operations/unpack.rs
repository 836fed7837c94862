//! Archive → INI tree
//!
//! Entries are decoded and written one at a time. A decode failure stops
//! the unpack immediately and leaves the files written so far in place.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::types::{CoalescedPhase, CoalescedProgress, ProgressCallback, UnpackOptions, UnpackResult};
use crate::error::{Error, Result};
use crate::formats::coalesced::{CoalescedReader, Entry, probe_coalesced, render_ini};
use crate::utils::path::entry_output_path;

/// Resolve the directory an archive is unpacked into
pub fn unpack_destination(
    archive: &Path,
    output: Option<&Path>,
    options: &UnpackOptions,
) -> Result<PathBuf> {
    let base = match output {
        Some(dir) => dir.to_path_buf(),
        None => archive
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    if !options.create_subfolder {
        return Ok(base);
    }

    let stem = archive
        .file_stem()
        .ok_or_else(|| Error::InvalidPath(format!("no file name in {}", archive.display())))?;
    Ok(base.join(stem))
}

/// Unpack an archive into a tree of INI files
///
/// # Errors
///
/// Returns [`Error::NotCoalesced`] if the entry count heuristic fails (nothing
/// is written), or [`Error::UnpackAborted`] wrapping the first decode or
/// write error once entries are being processed.
pub fn unpack_archive(
    archive: &Path,
    output: Option<&Path>,
    options: &UnpackOptions,
    progress: ProgressCallback,
) -> Result<UnpackResult> {
    let output_dir = unpack_destination(archive, output, options)?;

    progress(&CoalescedProgress::new(CoalescedPhase::Validating, 0, 0));
    let mut input = BufReader::new(File::open(archive)?);
    let total = probe_coalesced(&mut input)? as usize;

    tracing::info!(
        "Unpacking {} entries from {} to {}",
        total,
        archive.display(),
        output_dir.display()
    );
    fs::create_dir_all(&output_dir)?;

    let mut reader = CoalescedReader::new(input);
    let mut files = Vec::with_capacity(total);

    let aborted = |written: usize, source: Error| Error::UnpackAborted {
        written,
        total,
        source: Box::new(source),
    };

    reader
        .read_entry_count()
        .map_err(|e| aborted(0, e))?;

    for index in 0..total {
        let entry = reader.read_entry().map_err(|e| aborted(files.len(), e))?;

        progress(&CoalescedProgress::with_file(
            CoalescedPhase::Unpacking,
            index + 1,
            total,
            &entry.path,
        ));

        let path = write_entry(&output_dir, &entry).map_err(|e| aborted(files.len(), e))?;
        files.push(path);
    }

    progress(&CoalescedProgress::new(CoalescedPhase::Complete, total, total));
    tracing::info!("Unpacked {} files", files.len());

    Ok(UnpackResult { output_dir, files })
}

/// Write one entry as INI text under `output_dir`
pub fn write_entry(output_dir: &Path, entry: &Entry) -> Result<PathBuf> {
    let path = entry_output_path(output_dir, &entry.path)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if path.exists() {
        tracing::warn!("overwriting {} (duplicate entry path)", path.display());
    }
    fs::write(&path, render_ini(entry))?;
    tracing::debug!("wrote {}", path.display());
    Ok(path)
}
