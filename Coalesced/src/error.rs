//! Error types for `Coalesced`

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A field of the Coalesced wire format, used to locate decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Leading entry count of the archive.
    EntryCount,
    /// Path of a file entry.
    EntryPath,
    /// Number of sections in an entry.
    SectionCount,
    /// Name of a section.
    SectionName,
    /// Number of records in a section.
    RecordCount,
    /// Key of a record.
    RecordKey,
    /// Value of a record.
    RecordValue,
    /// Two-byte null terminator following a string.
    Terminator,
}

impl Field {
    /// Human-readable name used in error messages and logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EntryCount => "entry count",
            Self::EntryPath => "entry path",
            Self::SectionCount => "section count",
            Self::SectionName => "section name",
            Self::RecordCount => "record count",
            Self::RecordKey => "record key",
            Self::RecordValue => "record value",
            Self::Terminator => "null terminator",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error type for `Coalesced` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Wire Format Errors ====================
    /// The stream ended before a field could be read completely.
    #[error("unexpected end of stream while reading {field} at byte offset {offset}")]
    TruncatedStream {
        /// The field being read.
        field: Field,
        /// Byte offset where the field starts.
        offset: u64,
    },

    /// A length or count field cannot describe a satisfiable read.
    #[error("malformed {field} length {raw} at byte offset {offset}")]
    MalformedLength {
        /// The field the length belongs to.
        field: Field,
        /// Byte offset of the length field.
        offset: u64,
        /// The raw signed value read from the stream.
        raw: i32,
    },

    /// A name-like field (entry path, section name, key) has zero length.
    #[error("empty {field} at byte offset {offset}")]
    EmptyName {
        /// The field that was empty.
        field: Field,
        /// Byte offset of the length field.
        offset: u64,
    },

    /// The archive failed the entry count heuristic.
    #[error("probably not a Coalesced file: entry count {count} is outside 1..=10000")]
    NotCoalesced {
        /// The declared entry count.
        count: i32,
    },

    /// A string or collection is too large for a 32-bit length field.
    #[error("{field} too long to encode: {len}")]
    FieldTooLong {
        /// The field being encoded.
        field: Field,
        /// The length that did not fit.
        len: usize,
    },

    /// Decoding stopped part-way through an unpack.
    ///
    /// Files written before the failure are left on disk.
    #[error(
        "unpack aborted after writing {written} of {total} entries (written files were kept): {source}"
    )]
    UnpackAborted {
        /// Number of entry files already written.
        written: usize,
        /// Entry count declared by the archive.
        total: usize,
        /// The error that stopped decoding.
        source: Box<Error>,
    },

    // ==================== Text Format Errors ====================
    /// A `key=value` line appeared before any `[section]` header.
    #[error("line {line}: record outside of any [section]")]
    IniRecordOutsideSection {
        /// One-based line number.
        line: usize,
    },

    /// A `[]` header or a `=value` line with nothing before the `=`.
    #[error("line {line}: empty {field}")]
    IniEmptyName {
        /// The empty field.
        field: Field,
        /// One-based line number.
        line: usize,
    },

    /// An entry with an empty path was handed to the encoder.
    #[error("cannot encode an entry with an empty path")]
    EmptyEntryPath,

    /// An empty section name or key was handed to the encoder.
    #[error("cannot encode empty {field} in entry '{entry}'")]
    EmptyTextField {
        /// The empty field.
        field: Field,
        /// Path of the entry containing it.
        entry: String,
    },

    /// Reading or parsing one input file of a repack failed.
    #[error("{}: {source}", .path.display())]
    EntryFile {
        /// The input file.
        path: PathBuf,
        /// The underlying error.
        source: Box<Error>,
    },

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Byte offset in the archive where this error was detected, if known
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::TruncatedStream { offset, .. }
            | Self::MalformedLength { offset, .. }
            | Self::EmptyName { offset, .. } => Some(*offset),
            Self::UnpackAborted { source, .. } => source.offset(),
            _ => None,
        }
    }
}

// Add conversion from walkdir::Error
impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `Coalesced` operations.
pub type Result<T> = std::result::Result<T, Error>;
