use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use log::info;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::wrap_io_err;
use crate::io::ReadAt;
use crate::{Error, Result};

use super::parser::{PaqParser, ScanOptions};
use super::structures::{Entry, RawPackage};

/// Upper bound for the copy buffer used while extracting an entry.
pub const EXTRACT_BUF_SIZE: usize = 64 * 1024;

/// Container extractor
pub struct PaqExtractor<R: ReadAt> {
    parser: PaqParser<R>,
}

impl<R: ReadAt> PaqExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: PaqParser::new(reader),
        }
    }

    /// Scan the container's metadata table
    pub async fn list_files(&self, name: &str, options: ScanOptions) -> Result<RawPackage> {
        self.parser.scan(name, options).await
    }

    /// Copy one entry's content into `out`, returning the number of bytes
    /// written.
    pub async fn extract_to_writer<W>(&self, entry: &Entry, out: &mut W, out_path: &Path) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let cap = usize::try_from(entry.size).unwrap_or(usize::MAX);
        let mut buf = vec![0u8; EXTRACT_BUF_SIZE.min(cap)];
        let mut copied = 0u64;

        while copied < entry.size {
            let remaining = usize::try_from(entry.size - copied).unwrap_or(usize::MAX);
            let want = buf.len().min(remaining);
            let n = self
                .parser
                .reader()
                .read_at(entry.offset + copied, &mut buf[..want])
                .await?;
            if n == 0 {
                return Err(Error::Truncated {
                    name: entry.name.clone(),
                    copied,
                    size: entry.size,
                });
            }
            out.write_all(&buf[..n])
                .await
                .map_err(wrap_io_err!(out_path, "write"))?;
            copied += n as u64;
        }

        Ok(copied)
    }

    /// Extract one entry to `dest_dir/<name>`, replacing any existing file.
    pub async fn extract_to_dir(&self, entry: &Entry, dest_dir: &Path) -> Result<PathBuf> {
        check_entry_name(&entry.name)?;
        let output_path = dest_dir.join(&entry.name);

        let mut file = fs::File::create(&output_path)
            .await
            .map_err(wrap_io_err!(&output_path, "create"))?;
        self.extract_to_writer(entry, &mut file, &output_path).await?;
        file.flush()
            .await
            .map_err(wrap_io_err!(&output_path, "flush"))?;

        info!("extracted {} ({} bytes)", output_path.display(), entry.size);
        Ok(output_path)
    }

    /// Extract every entry of `package`, in table order.
    pub async fn extract_all(&self, package: &RawPackage, dest_dir: &Path) -> Result<Vec<PathBuf>> {
        if !dest_dir.as_os_str().is_empty() {
            fs::create_dir_all(dest_dir)
                .await
                .map_err(wrap_io_err!(dest_dir, "create directory"))?;
        }

        let mut written = Vec::with_capacity(package.len());
        for entry in &package.entries {
            written.push(self.extract_to_dir(entry, dest_dir).await?);
        }
        Ok(written)
    }
}

/// An entry name must be a single plain file name so it cannot point
/// outside the destination directory.
fn check_entry_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.chars().any(std::path::is_separator) => {
            Ok(())
        }
        _ => Err(Error::InvalidEntryName(name.to_string())),
    }
}
