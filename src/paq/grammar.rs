//! Text encoding of the metadata table.
//!
//! Every file is described by one record and the records are concatenated
//! without whitespace:
//!
//! ```text
//! ://note.txt>>11?://rabbit.png>>2048?;;
//! ```
//!
//! A record is `RECORD_START name SEPARATOR size TERMINATOR` and the table
//! ends with [`END_MARKER`]. Names may contain anything except the markers
//! and path separators; sizes are plain decimal digits.

use crate::{Error, Result};

pub const RECORD_START: &str = "://";
pub const SEPARATOR: &str = ">>";
pub const TERMINATOR: char = '?';
pub const END_MARKER: &str = ";;";

/// Returns `true` if `name` can be written to a record and read back
/// unchanged.
pub fn is_encodable(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(RECORD_START)
        && !name.contains(SEPARATOR)
        && !name.contains(TERMINATOR)
        && !name.chars().any(std::path::is_separator)
}

/// Append the record for one file to `table`.
pub fn encode_record(table: &mut String, name: &str, size: u64) -> Result<()> {
    if !is_encodable(name) {
        return Err(Error::UnencodableName(name.to_string()));
    }
    table.push_str(RECORD_START);
    table.push_str(name);
    table.push_str(SEPARATOR);
    table.push_str(&size.to_string());
    table.push(TERMINATOR);
    Ok(())
}

/// Encode a full table, end marker included.
pub fn encode_table<'a, I>(records: I) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut table = String::new();
    for (name, size) in records {
        encode_record(&mut table, name, size)?;
    }
    table.push_str(END_MARKER);
    Ok(table)
}

/// Find where the table ends in `buf`, which holds the bytes directly after
/// the container header.
///
/// The end marker only counts at the very start (empty table) or right after
/// a record terminator, so a `;;` inside a file name is not mistaken for it.
/// Returns the table length including the marker.
pub fn find_table_end(buf: &[u8]) -> Option<usize> {
    find_table_end_from(buf, 0)
}

/// Like [`find_table_end`], but only considers markers starting at `from`
/// or later. Bytes before `from` are still used to check the terminator in
/// front of a marker.
pub fn find_table_end_from(buf: &[u8], from: usize) -> Option<usize> {
    let marker = END_MARKER.as_bytes();
    (from..buf.len().saturating_sub(marker.len() - 1))
        .find(|&i| {
            &buf[i..i + marker.len()] == marker && (i == 0 || buf[i - 1] == TERMINATOR as u8)
        })
        .map(|i| i + marker.len())
}

/// Split a table (end marker included) into the text of each record, without
/// terminators.
pub fn record_segments(table: &str) -> impl Iterator<Item = &str> {
    let body = table.strip_suffix(END_MARKER).unwrap_or(table);
    let mut segments: Vec<&str> = body.split(TERMINATOR).collect();
    // The last terminator leaves an empty tail that is not a record.
    segments.pop();
    segments.into_iter()
}

/// Decode a single record segment.
///
/// Returns `Ok(None)` when the segment does not have the record shape at
/// all; whether that is fatal is up to the caller. A well-shaped record with
/// a size that is not a `u64` is always an error.
pub fn decode_record(segment: &str) -> Result<Option<(&str, u64)>> {
    let Some(rest) = segment.strip_prefix(RECORD_START) else {
        return Ok(None);
    };
    let Some(split) = rest.rfind(SEPARATOR) else {
        return Ok(None);
    };
    let name = &rest[..split];
    let size_text = &rest[split + SEPARATOR.len()..];

    if name.is_empty() || size_text.is_empty() || name.contains(RECORD_START) {
        return Ok(None);
    }

    let size = size_text
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| size_text.parse::<u64>().ok())
        .flatten()
        .ok_or_else(|| Error::InvalidSize {
            name: name.to_string(),
            text: size_text.to_string(),
        })?;

    Ok(Some((name, size)))
}
