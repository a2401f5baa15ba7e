//! # paq
//!
//! Pack files and directories into a single EPAQ container and get them
//! back out again.
//!
//! A container is a short signature, a text metadata table listing every
//! file's name and size, and the files' raw bytes concatenated in table
//! order. Nothing is compressed or checksummed; the format exists to ship a
//! flat set of files as one.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use paq::ScanOptions;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let inputs = vec![PathBuf::from("note.txt"), PathBuf::from("assets")];
//!     let written = paq::pack(Path::new("package.pq"), &inputs).await?;
//!
//!     let package = paq::scan(&written, ScanOptions::default()).await?;
//!     print!("{package}");
//!
//!     paq::unpack(&written, Path::new("out"), ScanOptions::default()).await?;
//!     Ok(())
//! }
//! ```

mod error;

pub mod cli;
pub mod io;
pub mod paq;

pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{LocalFileReader, ReadAt};
pub use paq::{
    ContainerHeader, Entry, PaqExtractor, PaqPacker, PaqParser, RawPackage, ScanOptions, pack,
    pack_into, resolve_output, scan, scan_all, unpack,
};
