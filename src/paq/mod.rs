//! EPAQ container packing, scanning and extraction.
//!
//! ## Container layout
//!
//! ```text
//! "EPAQ"                signature
//! "0" "1"               format major and minor version digits
//! ://a.txt>>3?...;;     metadata table, see [`grammar`]
//! <a.txt content>       exactly 3 bytes
//! ...                   remaining files, in table order
//! ```
//!
//! Content offsets are not stored anywhere: they are rebuilt at scan time
//! from the header length, the table length and the sizes of the entries
//! before each one.
//!
//! ## Architecture
//!
//! - [`structures`]: header, entry and package types
//! - [`grammar`]: the text encoding of the metadata table
//! - [`parser`]: table parsing and offset reconstruction
//! - [`packer`]: directory expansion and the two-pass container write
//! - [`extractor`]: offset-based extraction
//!
//! ## Limitations
//!
//! - No compression, encryption or checksums
//! - Directories are flattened to the files directly inside them

pub mod extractor;
pub mod grammar;
pub mod packer;
pub mod parser;
pub mod structures;

pub use extractor::PaqExtractor;
pub use packer::{PaqPacker, resolve_output};
pub use parser::{PaqParser, ScanOptions};
pub use structures::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Result;
use crate::io::LocalFileReader;

/// Pack `inputs` into a new container next to `requested`, never
/// overwriting an existing file. Returns the path actually written.
///
/// If writing fails after the container was created, the partial file is
/// removed. Nothing is created when an input cannot be read up front.
pub async fn pack(requested: &Path, inputs: &[PathBuf]) -> Result<PathBuf> {
    let target = resolve_output(requested).await?;
    PaqPacker::new(inputs).await?.write_or_remove(&target).await?;
    Ok(target)
}

/// Pack `inputs` into `target`, which must not exist. A partial file is
/// left behind on failure.
pub async fn pack_into(target: &Path, inputs: &[PathBuf]) -> Result<()> {
    PaqPacker::new(inputs).await?.write(target).await
}

/// Scan one container's metadata table.
pub async fn scan(container: &Path, options: ScanOptions) -> Result<RawPackage> {
    let reader = Arc::new(LocalFileReader::new(container)?);
    PaqParser::new(reader)
        .scan(&display_name(container), options)
        .await
}

/// Scan several containers, one package per container in argument order.
pub async fn scan_all(containers: &[PathBuf], options: ScanOptions) -> Result<Vec<RawPackage>> {
    let mut packages = Vec::with_capacity(containers.len());
    for container in containers {
        packages.push(scan(container, options).await?);
    }
    Ok(packages)
}

/// Extract every file of `container` into `dest_dir`. Returns the written
/// paths in table order.
pub async fn unpack(container: &Path, dest_dir: &Path, options: ScanOptions) -> Result<Vec<PathBuf>> {
    let reader = Arc::new(LocalFileReader::new(container)?);
    let extractor = PaqExtractor::new(reader);
    let package = extractor
        .list_files(&display_name(container), options)
        .await?;
    extractor.extract_all(&package, dest_dir).await
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
