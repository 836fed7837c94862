//! Options, progress and result types for archive operations

use std::path::PathBuf;

use serde::Serialize;

use crate::formats::coalesced::{Entry, PathConvention};

/// Progress callback type
pub type ProgressCallback<'a> = &'a dyn Fn(&CoalescedProgress);

/// Progress information for unpack and repack
#[derive(Debug, Clone)]
pub struct CoalescedProgress {
    /// Current operation phase
    pub phase: CoalescedPhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current entry being processed (if applicable)
    pub current_file: Option<String>,
}

impl CoalescedProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: CoalescedPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with an entry name
    #[must_use]
    pub fn with_file(
        phase: CoalescedPhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of an archive operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalescedPhase {
    /// Checking the entry count heuristic
    Validating,
    /// Decoding entries and writing INI files
    Unpacking,
    /// Scanning the input directory (during repack)
    ScanningFiles,
    /// Parsing INI files and encoding entries
    Repacking,
    /// Operation complete
    Complete,
}

impl CoalescedPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "Validating",
            Self::Unpacking => "Unpacking",
            Self::ScanningFiles => "Scanning files",
            Self::Repacking => "Repacking",
            Self::Complete => "Complete",
        }
    }
}

/// Options for unpacking an archive to INI files
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// Write into `<output>/<archive stem>/` rather than `<output>/`
    pub create_subfolder: bool,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            create_subfolder: true,
        }
    }
}

impl UnpackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_create_subfolder(mut self, create_subfolder: bool) -> Self {
        self.create_subfolder = create_subfolder;
        self
    }
}

/// Options for repacking a directory of INI files
#[derive(Debug, Clone, Default)]
pub struct RepackOptions {
    /// How entry paths are written into the archive
    pub path_convention: PathConvention,
}

impl RepackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_path_convention(mut self, path_convention: PathConvention) -> Self {
        self.path_convention = path_convention;
        self
    }
}

/// Result of a successful unpack
#[derive(Debug, Clone)]
pub struct UnpackResult {
    /// Directory the INI files were written under
    pub output_dir: PathBuf,
    /// Files written, in archive order
    pub files: Vec<PathBuf>,
}

/// Result of a successful repack
#[derive(Debug, Clone)]
pub struct RepackResult {
    /// Archive written
    pub output_file: PathBuf,
    /// Number of entries encoded
    pub entries: usize,
    /// Number of records encoded across all entries
    pub records: usize,
}

/// Outcome of the format heuristic
#[derive(Debug, Clone)]
pub struct ValidationInfo {
    /// Declared entry count
    pub entry_count: u32,
    /// Normalized path of the first entry, if it could be decoded
    pub first_entry: Option<String>,
}

/// Per-entry summary used by listings
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub path: String,
    pub sections: usize,
    pub records: usize,
}

impl From<&Entry> for EntrySummary {
    fn from(entry: &Entry) -> Self {
        Self {
            path: entry.path.clone(),
            sections: entry.sections.len(),
            records: entry.record_count(),
        }
    }
}
