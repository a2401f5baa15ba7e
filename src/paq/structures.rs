use std::fmt;

use crate::{Error, Result};

/// Container header: signature plus one ASCII digit each for the major and
/// minor format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub major: u8,
    pub minor: u8,
}

impl ContainerHeader {
    pub const SIGNATURE: &'static [u8] = b"EPAQ";
    pub const SIZE: usize = 6;

    /// The only format variant this crate reads and writes.
    pub const CURRENT: ContainerHeader = ContainerHeader {
        major: b'0',
        minor: b'1',
    };

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[..4].copy_from_slice(Self::SIGNATURE);
        buf[4] = self.major;
        buf[5] = self.minor;
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let shown = &data[..data.len().min(Self::SIGNATURE.len())];
        if shown != &Self::SIGNATURE[..shown.len()] {
            return Err(Error::BadSignature(
                String::from_utf8_lossy(shown).into_owned(),
            ));
        }
        if data.len() < Self::SIZE {
            return Err(Error::ShortHeader { len: data.len() });
        }

        let header = Self {
            major: data[4],
            minor: data[5],
        };
        if header != Self::CURRENT {
            return Err(Error::UnsupportedVersion {
                major: header.major as char,
                minor: header.minor as char,
            });
        }
        Ok(header)
    }

    /// Version string in `major.minor` form, e.g. `0.1`.
    pub fn version(&self) -> String {
        format!("{}.{}", self.major as char, self.minor as char)
    }
}

/// One embedded file recovered from a metadata table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub size: u64,
    /// Absolute position of the content in the container. Never stored on
    /// disk; derived from the header, the table length and previous sizes.
    pub offset: u64,
}

impl Entry {
    /// Offset one past the last content byte.
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.size)
    }
}

/// Entries scanned from a single container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPackage {
    /// File name of the container the entries were read from.
    pub name: String,
    pub entries: Vec<Entry>,
    /// Offset of the first content byte (header plus metadata table).
    pub data_offset: u64,
}

impl RawPackage {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all entry sizes.
    pub fn content_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

impl fmt::Display for RawPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        for entry in &self.entries {
            writeln!(
                f,
                "  {} ({} bytes, offset {})",
                entry.name, entry.size, entry.offset
            )?;
        }
        Ok(())
    }
}
