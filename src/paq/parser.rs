//! Metadata table parser.
//!
//! Reads a container from any source that implements [`ReadAt`] and turns
//! its metadata table into [`Entry`] descriptors.
//!
//! ## Offset reconstruction
//!
//! Offsets are never stored. The first entry starts right after the table
//! end marker, and every following entry starts where the previous one
//! ended. This only holds if the packer wrote content in table order, so
//! the parser checks that the last entry still ends inside the container.

use std::sync::Arc;

use log::{debug, warn};

use crate::io::ReadAt;
use crate::{Error, Result};

use super::grammar;
use super::structures::{ContainerHeader, Entry, RawPackage};

/// How much of the table is requested from the reader at a time.
const TABLE_CHUNK_SIZE: usize = 4096;

/// Options controlling how a metadata table is decoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Skip records that do not match the grammar instead of failing.
    pub lenient: bool,
}

/// Metadata table parser for one container.
///
/// ## Example
///
/// ```ignore
/// let parser = PaqParser::new(reader);
/// let package = parser.scan("test.pq", ScanOptions::default()).await?;
/// for entry in &package.entries {
///     println!("{} @ {}", entry.name, entry.offset);
/// }
/// ```
pub struct PaqParser<R: ReadAt> {
    reader: Arc<R>,
    /// Total size of the container in bytes
    size: u64,
}

impl<R: ReadAt> PaqParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Read and validate the fixed-size header.
    pub async fn read_header(&self) -> Result<ContainerHeader> {
        let mut buf = [0u8; ContainerHeader::SIZE];
        let n = self.reader.read_at(0, &mut buf).await?;
        ContainerHeader::from_bytes(&buf[..n])
    }

    /// Read the raw metadata table, end marker included.
    ///
    /// Reads forward from the end of the header until the end marker shows
    /// up, then cuts the buffer right after it.
    pub async fn read_table(&self) -> Result<Vec<u8>> {
        let mut table = Vec::new();
        let mut chunk = vec![0u8; TABLE_CHUNK_SIZE];
        let mut offset = ContainerHeader::SIZE as u64;

        loop {
            let n = self.reader.read_at(offset, &mut chunk).await?;
            if n == 0 {
                return Err(Error::UnterminatedTable);
            }
            offset += n as u64;
            // Step back one byte, the marker may straddle two reads.
            let from = table.len().saturating_sub(grammar::END_MARKER.len() - 1);
            table.extend_from_slice(&chunk[..n]);

            if let Some(end) = grammar::find_table_end_from(&table, from) {
                table.truncate(end);
                return Ok(table);
            }
        }
    }

    /// Decode the container's table into entries with absolute offsets.
    ///
    /// `name` is only used to label the returned package.
    pub async fn scan(&self, name: &str, options: ScanOptions) -> Result<RawPackage> {
        self.read_header().await?;
        let table = self.read_table().await?;
        let data_offset = (ContainerHeader::SIZE + table.len()) as u64;
        debug!("{name}: metadata table is {} bytes", table.len());

        let entries = decode_entries(&String::from_utf8_lossy(&table), data_offset, options)?;

        if let Some(last) = entries.last() {
            let end = last.end().ok_or(Error::Overflow)?;
            if end > self.size {
                return Err(Error::OutOfBounds {
                    name: last.name.clone(),
                    end,
                    len: self.size,
                });
            }
        }

        Ok(RawPackage {
            name: name.to_string(),
            entries,
            data_offset,
        })
    }

    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }
}

/// Turn a table into entries, assigning offsets from `data_offset` onward.
pub fn decode_entries(table: &str, data_offset: u64, options: ScanOptions) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::new();

    for segment in grammar::record_segments(table) {
        let Some((name, size)) = grammar::decode_record(segment)? else {
            if options.lenient {
                warn!("skipping malformed metadata record {segment:?}");
                continue;
            }
            return Err(Error::MalformedRecord(segment.to_string()));
        };

        let offset = match entries.last() {
            None => data_offset,
            Some(prev) => prev.end().ok_or(Error::Overflow)?,
        };

        entries.push(Entry {
            name: name.to_string(),
            size,
            offset,
        });
    }

    Ok(entries)
}
