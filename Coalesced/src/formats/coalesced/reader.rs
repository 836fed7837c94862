//! Coalesced archive decoding
//!
//! Decoding is strictly sequential: every length prefix decides where the
//! next field starts, so a bad length desynchronizes everything after it
//! and aborts the whole read.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use super::length::{read_bytes, read_count, read_length_field, read_name_length, skip_terminator};
use super::text::{decode_name, decode_value_units};
use super::{CoalescedArchive, Entry, MAX_ENTRY_COUNT, Record, Section};
use crate::error::{Error, Field, Result};
use crate::utils::path::normalize_entry_path;

/// Cap on speculative preallocation from untrusted counts
const MAX_PREALLOC: usize = 256;

/// Sequential reader over a Coalesced byte stream
pub struct CoalescedReader<R: Read + Seek> {
    reader: R,
}

impl<R: Read + Seek> CoalescedReader<R> {
    /// Create a new reader positioned at the start of an archive
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Current byte offset in the underlying stream
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.reader.stream_position()?)
    }

    /// Read the leading entry count
    pub fn read_entry_count(&mut self) -> Result<u32> {
        read_count(&mut self.reader, Field::EntryCount)
    }

    /// Read the next entry (path, sections and records).
    ///
    /// The returned path is already normalized with [`normalize_entry_path`].
    pub fn read_entry(&mut self) -> Result<Entry> {
        let raw_path = self.read_name(Field::EntryPath)?;
        let path = normalize_entry_path(&raw_path);
        let section_count = read_count(&mut self.reader, Field::SectionCount)?;

        tracing::debug!("entry '{}' -> '{}' ({} sections)", raw_path, path, section_count);

        let mut sections = Vec::with_capacity((section_count as usize).min(MAX_PREALLOC));
        for _ in 0..section_count {
            sections.push(self.read_section()?);
        }

        Ok(Entry { path, sections })
    }

    fn read_section(&mut self) -> Result<Section> {
        let name = self.read_name(Field::SectionName)?;
        let record_count = read_count(&mut self.reader, Field::RecordCount)?;

        let mut records = Vec::with_capacity((record_count as usize).min(MAX_PREALLOC));
        for _ in 0..record_count {
            let key = self.read_name(Field::RecordKey)?;
            let value = self.read_value()?;
            records.push(Record { key, value });
        }

        Ok(Section { name, records })
    }

    /// Read a required, non-empty name string and its terminator
    fn read_name(&mut self, field: Field) -> Result<String> {
        let offset = self.position()?;
        let byte_len = read_name_length(&mut self.reader, field)?;
        if byte_len == 0 {
            return Err(Error::EmptyName { field, offset });
        }

        let bytes = read_bytes(&mut self.reader, byte_len, field)?;
        skip_terminator(&mut self.reader)?;
        Ok(decode_name(&bytes))
    }

    fn read_value(&mut self) -> Result<String> {
        let length = read_length_field(&mut self.reader, Field::RecordValue)?;

        let value = if length.char_len() > 0 {
            let bytes = read_bytes(
                &mut self.reader,
                u64::from(length.char_len()) * 2,
                Field::RecordValue,
            )?;
            decode_value_units(&bytes)
        } else {
            String::new()
        };

        if length.has_terminator() {
            skip_terminator(&mut self.reader)?;
        }
        Ok(value)
    }

    /// Consume the reader, returning the underlying stream
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Check the entry count heuristic without consuming the stream.
///
/// Returns the declared entry count when it lies in `1..=10000`.
///
/// # Errors
///
/// Returns [`Error::NotCoalesced`] for counts outside that range and
/// [`Error::TruncatedStream`] if the stream is shorter than four bytes.
pub fn probe_coalesced<R: Read + Seek>(reader: &mut R) -> Result<u32> {
    let start = reader.stream_position()?;
    let mut probe = CoalescedReader::new(&mut *reader);
    let count = match probe.read_entry_count() {
        Ok(count) => count,
        Err(Error::MalformedLength { raw, .. }) => return Err(Error::NotCoalesced { count: raw }),
        Err(e) => return Err(e),
    };

    if count == 0 || count > MAX_ENTRY_COUNT as u32 {
        return Err(Error::NotCoalesced { count: count as i32 });
    }

    // The first path is only read for diagnostics
    match probe.read_name(Field::EntryPath) {
        Ok(first) => tracing::debug!("probe: {} entries, first entry '{}'", count, first),
        Err(e) => tracing::debug!("probe: {} entries, first entry unreadable: {}", count, e),
    }

    reader.seek(SeekFrom::Start(start))?;
    Ok(count)
}

/// Read a Coalesced archive from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened, or any decode error
/// from [`parse_coalesced_bytes`].
pub fn read_coalesced<P: AsRef<Path>>(path: P) -> Result<CoalescedArchive> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    parse_coalesced_bytes(&data)
}

/// Decode a complete archive held in memory
///
/// No format heuristic is applied here; use [`probe_coalesced`] first when
/// the input may not be a Coalesced archive at all.
///
/// # Errors
///
/// Returns [`Error::TruncatedStream`] if the data ends mid-field,
/// [`Error::MalformedLength`] for negative counts and [`Error::EmptyName`]
/// for empty entry paths, section names or keys.
pub fn parse_coalesced_bytes(data: &[u8]) -> Result<CoalescedArchive> {
    let mut reader = CoalescedReader::new(Cursor::new(data));
    let count = reader.read_entry_count()?;

    let mut entries = Vec::with_capacity((count as usize).min(MAX_PREALLOC));
    for _ in 0..count {
        entries.push(reader.read_entry()?);
    }

    let consumed = reader.position()?;
    if consumed < data.len() as u64 {
        tracing::warn!(
            "{} trailing bytes after last entry",
            data.len() as u64 - consumed
        );
    }

    Ok(CoalescedArchive { entries })
}
