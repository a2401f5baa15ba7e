//! Error type shared by every container operation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An open, stat, read, write or seek failed.
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a paq container: bad signature {0:?}")]
    BadSignature(String),

    #[error("container is only {len} bytes, too short for a header")]
    ShortHeader { len: usize },

    #[error("unsupported container version {major}.{minor}")]
    UnsupportedVersion { major: char, minor: char },

    #[error("metadata table is not terminated before end of container")]
    UnterminatedTable,

    #[error("malformed metadata record {0:?}")]
    MalformedRecord(String),

    #[error("invalid size {text:?} for entry {name:?}")]
    InvalidSize { name: String, text: String },

    #[error("file name {0:?} cannot be stored in a metadata table")]
    UnencodableName(String),

    #[error("entry name {0:?} is not a plain file name")]
    InvalidEntryName(String),

    #[error("entry {name:?} ends at byte {end}, past container length {len}")]
    OutOfBounds { name: String, end: u64, len: u64 },

    #[error("entry offsets overflow")]
    Overflow,

    #[error("size mismatch for {}: expected {expected}, copied {actual}", .path.display())]
    LengthMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("container ended while reading entry {name:?} ({copied} of {size} bytes)")]
    Truncated { name: String, copied: u64, size: u64 },
}

/// Builds a closure for `map_err` that attaches the path and operation to an
/// I/O error.
macro_rules! wrap_io_err {
    ($path:expr, $context:expr) => {
        |source| $crate::Error::Io {
            context: $context,
            path: ::std::path::PathBuf::from($path),
            source,
        }
    };
}

pub(crate) use wrap_io_err;
