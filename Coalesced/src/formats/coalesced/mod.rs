//! Coalesced localization bundle format
//!
//! Big-endian archive of INI-style files used by Unreal Engine 3 games.
//! There is no magic signature and no offset table: the archive is a
//! sequence of length-prefixed UTF-16LE strings and counts.
//!
//! ```text
//! i32 entry_count
//! entry_count x {
//!     string path
//!     i32    section_count
//!     section_count x {
//!         string name
//!         i32    record_count
//!         record_count x { string key; string value }
//!     }
//! }
//! ```
//!
//! Every `string` is a [`LengthField`] followed by the text and a two-byte
//! null terminator that the length does not count.

mod ini;
mod length;
mod reader;
mod text;
mod writer;

pub use ini::{parse_ini, render_ini};
pub use length::{
    LengthField, LengthStyle, read_length_field, read_name_length, read_value_length,
    write_length,
};
pub use reader::{CoalescedReader, parse_coalesced_bytes, probe_coalesced, read_coalesced};
pub use text::{NAME_DECODERS, NameDecoder, decode_name, decode_value_units, encode_value};
pub use writer::{CoalescedWriter, serialize_coalesced, write_coalesced};

use serde::{Deserialize, Serialize};

/// Upper bound of the entry count heuristic used to recognise archives
pub const MAX_ENTRY_COUNT: i32 = 10_000;

/// Text stand-in for an embedded newline in a value (PILCROW SIGN)
pub const NEWLINE_ESCAPE: char = '\u{00B6}';

/// Wire unit that marks an embedded newline inside a value (`"\n\0"`)
pub const NEWLINE_SENTINEL: [u8; 2] = [b'\n', 0];

/// Two-byte null terminator following every string
pub const TERMINATOR: [u8; 2] = [0, 0];

/// Prefix written in front of entry paths by [`PathConvention::EngineRelative`]
pub const ENGINE_PATH_PREFIX: &str = "..\\..\\";

/// How entry paths are written when repacking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathConvention {
    /// `..\..\Config\Game.ini`, the layout shipped archives use
    #[default]
    EngineRelative,
    /// `Config\Game.ini`
    Bare,
}

impl PathConvention {
    /// Build the on-disk entry path for a normalized relative path
    #[must_use]
    pub fn apply(self, relative: &str) -> String {
        let relative = relative.replace('/', "\\");
        match self {
            Self::EngineRelative => format!("{ENGINE_PATH_PREFIX}{relative}"),
            Self::Bare => relative,
        }
    }
}

/// A single `key=value` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    /// Value in text form: embedded newlines are stored as [`NEWLINE_ESCAPE`]
    pub value: String,
}

impl Record {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The value with escapes turned back into real newlines
    #[must_use]
    pub fn logical_value(&self) -> String {
        self.value.replace(NEWLINE_ESCAPE, "\n")
    }
}

/// A named `[section]` and its records, in file order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub records: Vec<Record>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Append a record, returning `self` for chaining
    #[must_use]
    pub fn with_record(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.records.push(Record::new(key, value));
        self
    }

    /// First record with the given key
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.key == key)
    }
}

/// One INI file stored in the archive
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    /// Normalized relative path using `\` separators (e.g. `Config\Game.ini`)
    pub path: String,
    pub sections: Vec<Section>,
}

impl Entry {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sections: Vec::new(),
        }
    }

    /// Append a section, returning `self` for chaining
    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// First section with the given name
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Total number of records across all sections
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.sections.iter().map(|s| s.records.len()).sum()
    }
}

/// A decoded Coalesced archive
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoalescedArchive {
    pub entries: Vec<Entry>,
}

impl CoalescedArchive {
    /// Entry with the given normalized path
    pub fn get_entry(&self, path: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.path == path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
