//! Signed big-endian length fields
//!
//! A length field is an `i32` whose sign selects how the magnitude is read:
//! non-negative values are byte counts, negative values `V` are UTF-16
//! character counts of `-V - 1`. Both styles may appear in one archive.

use std::io::{self, Read, Seek, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Field, Result};

/// Unit of a [`LengthField`] magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthStyle {
    /// Non-negative raw value, magnitude is a byte count
    Bytes,
    /// Negative raw value, magnitude is a count of 2-byte characters
    UnicodeChars,
}

/// A decoded length prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthField {
    pub magnitude: u32,
    pub style: LengthStyle,
}

impl LengthField {
    #[must_use]
    pub fn new(magnitude: u32, style: LengthStyle) -> Self {
        Self { magnitude, style }
    }

    /// Interpret a raw wire value
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        if raw < 0 {
            // -i32::MIN - 1 == i32::MAX, so this never overflows in i64
            let magnitude = (-i64::from(raw) - 1) as u32;
            Self::new(magnitude, LengthStyle::UnicodeChars)
        } else {
            Self::new(raw as u32, LengthStyle::Bytes)
        }
    }

    /// Raw wire value, `None` if the magnitude does not fit the style
    #[must_use]
    pub fn to_raw(self) -> Option<i32> {
        match self.style {
            LengthStyle::Bytes => i32::try_from(self.magnitude).ok(),
            LengthStyle::UnicodeChars => {
                let raw = -(i64::from(self.magnitude) + 1);
                i32::try_from(raw).ok()
            }
        }
    }

    /// Number of bytes the field's payload occupies (terminator excluded)
    #[must_use]
    pub fn byte_len(self) -> u64 {
        match self.style {
            LengthStyle::Bytes => u64::from(self.magnitude),
            LengthStyle::UnicodeChars => u64::from(self.magnitude) * 2,
        }
    }

    /// Number of 2-byte characters for value payloads
    #[must_use]
    pub fn char_len(self) -> u32 {
        self.magnitude
    }

    /// Whether a null terminator follows the payload.
    ///
    /// Only a raw `0` means "nothing follows"; `-1` is an empty string
    /// that still carries its terminator.
    #[must_use]
    pub fn has_terminator(self) -> bool {
        !(self.style == LengthStyle::Bytes && self.magnitude == 0)
    }
}

/// Read a raw big-endian `i32`, reporting truncation against `field`
pub(super) fn read_i32_field<R: Read + Seek>(reader: &mut R, field: Field) -> Result<(i32, u64)> {
    let offset = reader.stream_position()?;
    let raw = reader
        .read_i32::<BigEndian>()
        .map_err(|e| truncated(e, field, offset))?;
    Ok((raw, offset))
}

/// Read a count field (entries, sections, records); negative counts are malformed
pub(super) fn read_count<R: Read + Seek>(reader: &mut R, field: Field) -> Result<u32> {
    let (raw, offset) = read_i32_field(reader, field)?;
    tracing::debug!("{} = {} @ {}", field, raw, offset);
    u32::try_from(raw).map_err(|_| Error::MalformedLength { field, offset, raw })
}

/// Read exactly `len` bytes without trusting `len` for preallocation
pub(super) fn read_bytes<R: Read + Seek>(reader: &mut R, len: u64, field: Field) -> Result<Vec<u8>> {
    let offset = reader.stream_position()?;
    let mut buf = Vec::new();
    reader.by_ref().take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(Error::TruncatedStream { field, offset });
    }
    Ok(buf)
}

/// Consume the two-byte null terminator after a string.
///
/// The terminator's contents are not checked.
pub(super) fn skip_terminator<R: Read + Seek>(reader: &mut R) -> Result<()> {
    let offset = reader.stream_position()?;
    let mut terminator = [0u8; 2];
    reader
        .read_exact(&mut terminator)
        .map_err(|e| truncated(e, Field::Terminator, offset))
}

fn truncated(err: io::Error, field: Field, offset: u64) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::TruncatedStream { field, offset }
    } else {
        Error::Io(err)
    }
}

/// Read one length field and its style
pub fn read_length_field<R: Read + Seek>(reader: &mut R, field: Field) -> Result<LengthField> {
    let (raw, offset) = read_i32_field(reader, field)?;
    let length = LengthField::from_raw(raw);
    tracing::debug!(
        "{} length raw={} style={:?} magnitude={} @ {}",
        field,
        raw,
        length.style,
        length.magnitude,
        offset
    );
    Ok(length)
}

/// Read a name length and return its payload size in bytes
pub fn read_name_length<R: Read + Seek>(reader: &mut R, field: Field) -> Result<u64> {
    read_length_field(reader, field).map(LengthField::byte_len)
}

/// Read a value length and return its payload size in characters
pub fn read_value_length<R: Read + Seek>(reader: &mut R, field: Field) -> Result<u32> {
    read_length_field(reader, field).map(LengthField::char_len)
}

/// Write `count` as a length field of the given style
pub fn write_length<W: Write>(
    writer: &mut W,
    count: usize,
    style: LengthStyle,
    field: Field,
) -> Result<()> {
    let raw = u32::try_from(count)
        .ok()
        .and_then(|magnitude| LengthField::new(magnitude, style).to_raw())
        .ok_or(Error::FieldTooLong { field, len: count })?;
    writer.write_i32::<BigEndian>(raw)?;
    Ok(())
}

/// Write a plain big-endian count (entries, sections, records)
pub(super) fn write_count<W: Write>(writer: &mut W, count: usize, field: Field) -> Result<()> {
    let raw = i32::try_from(count).map_err(|_| Error::FieldTooLong { field, len: count })?;
    writer.write_i32::<BigEndian>(raw)?;
    Ok(())
}
