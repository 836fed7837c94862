//! UTF-16LE string handling
//!
//! Names go through an ordered list of decoders and the first one that
//! accepts the bytes wins. Values are decoded unit by unit so the
//! newline sentinel can be swapped for [`NEWLINE_ESCAPE`].

use super::{NEWLINE_ESCAPE, NEWLINE_SENTINEL};

/// One attempt in the name decoding chain
#[derive(Debug, Clone, Copy)]
pub struct NameDecoder {
    pub label: &'static str,
    pub decode: fn(&[u8]) -> Option<String>,
}

/// Decoders tried in order by [`decode_name`]. The last one never fails.
pub const NAME_DECODERS: &[NameDecoder] = &[
    NameDecoder {
        label: "utf-16le",
        decode: decode_utf16le_strict,
    },
    NameDecoder {
        label: "latin-1",
        decode: decode_latin1,
    },
    NameDecoder {
        label: "utf-8 (lossy)",
        decode: decode_utf8_lossy,
    },
];

fn decode_utf16le_strict(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

fn decode_latin1(bytes: &[u8]) -> Option<String> {
    Some(bytes.iter().map(|&b| char::from(b)).collect())
}

fn decode_utf8_lossy(bytes: &[u8]) -> Option<String> {
    Some(String::from_utf8_lossy(bytes).into_owned())
}

/// Decode a name payload with the first decoder in [`NAME_DECODERS`] that succeeds
pub fn decode_name(bytes: &[u8]) -> String {
    NAME_DECODERS
        .iter()
        .enumerate()
        .find_map(|(i, decoder)| {
            let text = (decoder.decode)(bytes)?;
            if i > 0 {
                tracing::debug!("name decoded as {} ({} bytes)", decoder.label, bytes.len());
            }
            Some(text)
        })
        .unwrap_or_default()
}

/// Decode value payload bytes (pairs of UTF-16LE units).
///
/// Sentinel units become [`NEWLINE_ESCAPE`], unpaired surrogates become
/// U+FFFD, and trailing CR/LF is trimmed.
pub fn decode_value_units(bytes: &[u8]) -> String {
    let units = bytes.chunks_exact(2).map(|pair| {
        if pair == NEWLINE_SENTINEL {
            NEWLINE_ESCAPE as u16
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });
    let value: String = char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    value.trim_end_matches(['\r', '\n']).to_string()
}

/// UTF-16 code units of a value with [`NEWLINE_ESCAPE`] turned back into `\n`
pub fn encode_value(value: &str) -> Vec<u16> {
    value
        .chars()
        .map(|c| if c == NEWLINE_ESCAPE { '\n' } else { c })
        .collect::<String>()
        .encode_utf16()
        .collect()
}

/// UTF-16LE bytes for a sequence of code units
pub(super) fn units_to_le_bytes(units: &[u16]) -> Vec<u8> {
    units.iter().flat_map(|u| u.to_le_bytes()).collect()
}
