//! INI text form of an entry
//!
//! ```ini
//! [Engine.GameInfo]
//! DefaultGame=MyGame.GameInfo
//!
//! [Menu]
//! Title=Line one¶Line two
//! ```
//!
//! Sections are separated by one blank line, with none after the last.
//! Embedded newlines are written as `¶`.

use super::{Entry, NEWLINE_ESCAPE, Record, Section};
use crate::error::{Error, Field, Result};

const UTF8_BOM: char = '\u{FEFF}';

/// Render an entry as INI text
pub fn render_ini(entry: &Entry) -> String {
    let mut out = String::new();

    for (i, section) in entry.sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push('[');
        out.push_str(&section.name);
        out.push_str("]\n");

        for record in &section.records {
            out.push_str(&record.key);
            out.push('=');
            // Values built in memory may still carry raw newlines
            out.extend(record.value.chars().map(|c| if c == '\n' { NEWLINE_ESCAPE } else { c }));
            out.push('\n');
        }
    }

    out
}

/// Parse INI text into an entry with the given relative path.
///
/// Headers are lines wrapped in `[` `]`; records split at the first `=`.
/// Blank lines are skipped and any other line is ignored with a warning.
///
/// # Errors
/// Returns [`Error::IniRecordOutsideSection`] if a record precedes the first
/// header, or [`Error::IniEmptyName`] for a `[]` header or an empty key.
pub fn parse_ini(path: &str, text: &str) -> Result<Entry> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for (index, line) in text.split('\n').enumerate() {
        let line = line.trim_end_matches('\r');

        if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            let name = &line[1..line.len() - 1];
            if name.is_empty() {
                return Err(Error::IniEmptyName {
                    field: Field::SectionName,
                    line: index + 1,
                });
            }
            current = Some(Section::new(name));
        } else if let Some((key, value)) = line.split_once('=') {
            let Some(section) = current.as_mut() else {
                return Err(Error::IniRecordOutsideSection { line: index + 1 });
            };
            if key.is_empty() {
                return Err(Error::IniEmptyName {
                    field: Field::RecordKey,
                    line: index + 1,
                });
            }
            section.records.push(Record::new(key, value));
        } else if !line.trim().is_empty() {
            tracing::warn!("{}:{}: ignoring line without '=': {}", path, index + 1, line);
        }
    }

    sections.extend(current);

    Ok(Entry {
        path: path.to_string(),
        sections,
    })
}
