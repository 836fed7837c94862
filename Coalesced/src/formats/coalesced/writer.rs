//! Coalesced archive encoding
//!
//! Every string is written with the negative (UTF-16 character count)
//! length style, whatever style the source archive used.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::length::{LengthStyle, write_count, write_length};
use super::text::{encode_value, units_to_le_bytes};
use super::{CoalescedArchive, Entry, PathConvention, TERMINATOR};
use crate::error::{Error, Field, Result};

/// Sequential writer producing a Coalesced byte stream
pub struct CoalescedWriter<W: Write> {
    writer: W,
    convention: PathConvention,
}

impl<W: Write> CoalescedWriter<W> {
    pub fn new(writer: W, convention: PathConvention) -> Self {
        Self { writer, convention }
    }

    /// Write the leading entry count
    pub fn write_entry_count(&mut self, count: usize) -> Result<()> {
        self.write_count(count, Field::EntryCount)
    }

    /// Write one entry with its sections and records
    pub fn write_entry(&mut self, entry: &Entry) -> Result<()> {
        if entry.path.is_empty() {
            return Err(Error::EmptyEntryPath);
        }

        let stored_path = self.convention.apply(&entry.path);
        self.write_string(&stored_path.encode_utf16().collect::<Vec<_>>(), Field::EntryPath)?;
        self.write_count(entry.sections.len(), Field::SectionCount)?;

        for section in &entry.sections {
            self.write_name(&section.name, Field::SectionName, entry)?;
            self.write_count(section.records.len(), Field::RecordCount)?;

            for record in &section.records {
                self.write_name(&record.key, Field::RecordKey, entry)?;
                self.write_string(&encode_value(&record.value), Field::RecordValue)?;
            }
        }

        Ok(())
    }

    fn write_name(&mut self, name: &str, field: Field, entry: &Entry) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptyTextField {
                field,
                entry: entry.path.clone(),
            });
        }
        self.write_string(&name.encode_utf16().collect::<Vec<_>>(), field)
    }

    fn write_count(&mut self, count: usize, field: Field) -> Result<()> {
        tracing::debug!("write {} = {}", field, count);
        write_count(&mut self.writer, count, field)
    }

    fn write_string(&mut self, units: &[u16], field: Field) -> Result<()> {
        tracing::debug!("write {} ({} chars)", field, units.len());
        write_length(&mut self.writer, units.len(), LengthStyle::UnicodeChars, field)?;
        self.writer.write_all(&units_to_le_bytes(units))?;
        self.writer.write_all(&TERMINATOR)?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Encode an archive into memory
///
/// # Errors
/// Returns an error if a name is empty or a field is too long to encode.
pub fn serialize_coalesced(
    archive: &CoalescedArchive,
    convention: PathConvention,
) -> Result<Vec<u8>> {
    let mut writer = CoalescedWriter::new(Vec::new(), convention);
    writer.write_entry_count(archive.entries.len())?;
    for entry in &archive.entries {
        writer.write_entry(entry)?;
    }
    writer.finish()
}

/// Write a Coalesced archive to disk
///
/// The whole archive is encoded before the file is touched, so an entry
/// that fails to encode leaves any existing file at `path` unchanged.
///
/// # Errors
/// Returns an error if an entry cannot be encoded or file writing fails.
pub fn write_coalesced<P: AsRef<Path>>(
    path: P,
    archive: &CoalescedArchive,
    convention: PathConvention,
) -> Result<()> {
    let bytes = serialize_coalesced(archive, convention)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::coalesced::{Section, parse_coalesced_bytes};
    use pretty_assertions::assert_eq;

    fn sample() -> CoalescedArchive {
        CoalescedArchive {
            entries: vec![
                Entry::new("Config\\DefaultGame.ini")
                    .with_section(
                        Section::new("Engine.GameInfo")
                            .with_record("DefaultGame", "MyGame.GameInfo")
                            .with_record("bAdminCanPause", "False"),
                    )
                    .with_section(Section::new("Empty")),
                Entry::new("Localization\\INT\\Menus.int")
                    .with_section(
                        Section::new("Menu")
                            .with_record("Title", "Line one\u{b6}Line two")
                            .with_record("Blank", "")
                            .with_record("Emoji", "\u{1F3AE} ready"),
                    ),
            ],
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let archive = sample();
        let bytes = serialize_coalesced(&archive, PathConvention::EngineRelative).unwrap();
        assert_eq!(parse_coalesced_bytes(&bytes).unwrap(), archive);
    }

    #[test]
    fn test_bare_convention_round_trip() {
        let archive = sample();
        let bytes = serialize_coalesced(&archive, PathConvention::Bare).unwrap();
        assert_eq!(parse_coalesced_bytes(&bytes).unwrap(), archive);
    }

    #[test]
    fn test_exact_bytes_for_single_record() {
        let archive = CoalescedArchive {
            entries: vec![
                Entry::new("a").with_section(Section::new("S").with_record("k", "")),
            ],
        };
        let bytes = serialize_coalesced(&archive, PathConvention::EngineRelative).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&1i32.to_be_bytes());
        // "..\..\a" is 7 characters
        expected.extend_from_slice(&(-8i32).to_be_bytes());
        for unit in "..\\..\\a".encode_utf16() {
            expected.extend_from_slice(&unit.to_le_bytes());
        }
        expected.extend_from_slice(&[0, 0]);
        expected.extend_from_slice(&1i32.to_be_bytes());
        expected.extend_from_slice(&(-2i32).to_be_bytes());
        expected.extend_from_slice(&[b'S', 0, 0, 0]);
        expected.extend_from_slice(&1i32.to_be_bytes());
        expected.extend_from_slice(&(-2i32).to_be_bytes());
        expected.extend_from_slice(&[b'k', 0, 0, 0]);
        // empty value: -1 then terminator
        expected.extend_from_slice(&(-1i32).to_be_bytes());
        expected.extend_from_slice(&[0, 0]);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_pilcrow_written_as_sentinel() {
        let archive = CoalescedArchive {
            entries: vec![
                Entry::new("a").with_section(Section::new("S").with_record("k", "x\u{b6}y")),
            ],
        };
        let bytes = serialize_coalesced(&archive, PathConvention::Bare).unwrap();
        // value payload sits just before the final terminator
        let tail = &bytes[bytes.len() - 8..];
        assert_eq!(tail, &[b'x', 0, b'\n', 0, b'y', 0, 0, 0]);
    }

    #[test]
    fn test_empty_key_rejected() {
        let archive = CoalescedArchive {
            entries: vec![Entry::new("a").with_section(Section::new("S").with_record("", "v"))],
        };
        let err = serialize_coalesced(&archive, PathConvention::Bare).unwrap_err();
        assert!(matches!(err, Error::EmptyTextField { field: Field::RecordKey, .. }));
    }

    #[test]
    fn test_empty_entry_path_rejected() {
        let archive = CoalescedArchive {
            entries: vec![Entry::new("")],
        };
        let err = serialize_coalesced(&archive, PathConvention::Bare).unwrap_err();
        assert!(matches!(err, Error::EmptyEntryPath));
        assert_eq!(err.to_string(), "cannot encode an entry with an empty path");
    }

    #[test]
    fn test_failed_write_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Coalesced.bin");
        std::fs::write(&path, b"previous archive").unwrap();

        let mut archive = sample();
        archive.entries.push(
            Entry::new("b.ini").with_section(Section::new("S").with_record("", "orphan")),
        );
        let err = write_coalesced(&path, &archive, PathConvention::EngineRelative).unwrap_err();
        assert!(matches!(err, Error::EmptyTextField { field: Field::RecordKey, .. }));
        assert_eq!(std::fs::read(&path).unwrap(), b"previous archive");
    }

    #[test]
    fn test_write_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Coalesced.bin");
        write_coalesced(&path, &sample(), PathConvention::EngineRelative).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(
            bytes,
            serialize_coalesced(&sample(), PathConvention::EngineRelative).unwrap()
        );
    }
}
