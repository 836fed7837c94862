//! INI tree → archive

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::types::{CoalescedPhase, CoalescedProgress, ProgressCallback, RepackOptions, RepackResult};
use crate::error::{Error, Result};
use crate::formats::coalesced::{CoalescedArchive, Entry, parse_ini, write_coalesced};
use crate::utils::path::relative_entry_path;

/// Default archive path for a directory: `<dir>.BIN` next to it
pub fn repack_destination(input_dir: &Path) -> Result<PathBuf> {
    let name = input_dir
        .file_name()
        .ok_or_else(|| Error::InvalidPath(format!("no directory name in {}", input_dir.display())))?;
    let mut file_name = name.to_os_string();
    file_name.push(".BIN");
    Ok(input_dir.with_file_name(file_name))
}

/// Find every file under `input_dir`, sorted by path
pub fn find_entry_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Parse every file under `input_dir` into archive entries
pub fn collect_entries(input_dir: &Path, progress: ProgressCallback) -> Result<Vec<Entry>> {
    progress(&CoalescedProgress::new(CoalescedPhase::ScanningFiles, 0, 0));
    let files = find_entry_files(input_dir)?;
    let total = files.len();
    tracing::info!("Found {} files in {}", total, input_dir.display());

    let mut entries = Vec::with_capacity(total);
    for (index, file) in files.iter().enumerate() {
        let relative = relative_entry_path(file.as_path(), input_dir)
            .ok_or_else(|| Error::InvalidPath(file.display().to_string()))?;

        progress(&CoalescedProgress::with_file(
            CoalescedPhase::Repacking,
            index + 1,
            total,
            &relative,
        ));

        let entry = read_entry_file(file, &relative).map_err(|e| Error::EntryFile {
            path: file.clone(),
            source: Box::new(e),
        })?;
        entries.push(entry);
    }

    Ok(entries)
}

fn read_entry_file(file: &Path, relative: &str) -> Result<Entry> {
    let text = fs::read_to_string(file)?;
    let entry = parse_ini(relative, &text)?;
    tracing::debug!(
        "parsed {} ({} sections, {} records)",
        relative,
        entry.sections.len(),
        entry.record_count()
    );
    Ok(entry)
}

/// Repack a directory of INI files into an archive
///
/// # Errors
/// Returns an error if the directory cannot be walked, a file cannot be
/// parsed, or the archive cannot be written.
pub fn repack_directory(
    input_dir: &Path,
    output: Option<&Path>,
    options: &RepackOptions,
    progress: ProgressCallback,
) -> Result<RepackResult> {
    if !input_dir.is_dir() {
        return Err(Error::InvalidPath(format!(
            "not a directory: {}",
            input_dir.display()
        )));
    }

    let output_file = match output {
        Some(path) => path.to_path_buf(),
        None => repack_destination(input_dir)?,
    };

    let archive = CoalescedArchive {
        entries: collect_entries(input_dir, progress)?,
    };
    let records: usize = archive.entries.iter().map(Entry::record_count).sum();

    if let Some(parent) = output_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_coalesced(&output_file, &archive, options.path_convention)?;

    progress(&CoalescedProgress::new(
        CoalescedPhase::Complete,
        archive.len(),
        archive.len(),
    ));
    tracing::info!(
        "Repacked {} entries ({} records) into {}",
        archive.len(),
        records,
        output_file.display()
    );

    Ok(RepackResult {
        output_file,
        entries: archive.len(),
        records,
    })
}
