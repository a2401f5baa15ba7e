use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::wrap_io_err;
use crate::{Error, Result};

use super::grammar;
use super::structures::ContainerHeader;

/// Upper bound for the copy buffer used while packing a file.
pub const PACK_BUF_SIZE: usize = 64 * 1024;

/// Find a name for a new container that does not exist yet.
///
/// `package.pq` is returned as is when free, otherwise `package.pq2`,
/// `package.pq3`, ... are tried in turn.
pub async fn resolve_output(requested: &Path) -> Result<PathBuf> {
    let mut candidate = requested.to_path_buf();
    let mut index = 1u64;

    while fs::try_exists(&candidate)
        .await
        .map_err(wrap_io_err!(&candidate, "stat"))?
    {
        index += 1;
        let mut name = OsString::from(requested.as_os_str());
        name.push(index.to_string());
        candidate = PathBuf::from(name);
    }

    if candidate != requested {
        debug!(
            "{} exists, writing {} instead",
            requested.display(),
            candidate.display()
        );
    }
    Ok(candidate)
}

/// Builds a container from a list of files and directories.
#[derive(Debug)]
pub struct PaqPacker {
    /// Inputs followed by the direct children of every input directory.
    paths: Vec<PathBuf>,
}

impl PaqPacker {
    /// Expand `inputs`: the children of each directory are appended after
    /// the inputs, sorted by file name. Directories are not recursed into.
    pub async fn new(inputs: &[PathBuf]) -> Result<Self> {
        let mut paths = inputs.to_vec();

        for input in inputs {
            let metadata = fs::metadata(input)
                .await
                .map_err(wrap_io_err!(input, "stat"))?;
            if !metadata.is_dir() {
                continue;
            }

            let mut children = Vec::new();
            let mut read_dir = fs::read_dir(input)
                .await
                .map_err(wrap_io_err!(input, "read directory"))?;
            while let Some(child) = read_dir
                .next_entry()
                .await
                .map_err(wrap_io_err!(input, "read directory"))?
            {
                children.push(child);
            }
            children.sort_by_key(|child| child.file_name());
            paths.extend(children.into_iter().map(|child| child.path()));
        }

        Ok(Self { paths })
    }

    /// Every path that will be considered, directories included.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Write the container to `target`, which must not exist yet.
    ///
    /// On error the partially written file is left behind.
    pub async fn write(&self, target: &Path) -> Result<()> {
        let mut out = create(target).await?;
        self.finish(&mut out, target).await
    }

    /// Like [`write`](Self::write), but removes the partial file when
    /// writing fails after `target` was created.
    ///
    /// A `target` that already existed is never touched.
    pub async fn write_or_remove(&self, target: &Path) -> Result<()> {
        let mut out = create(target).await?;
        let result = self.finish(&mut out, target).await;
        drop(out);

        if result.is_err() {
            match fs::remove_file(target).await {
                Ok(()) => debug!("removed partial container {}", target.display()),
                Err(err) => warn!("could not remove {}: {err}", target.display()),
            }
        }
        result
    }

    // Flush on failure too, so the partial file is complete on disk before
    // anyone decides what to do with it.
    async fn finish(&self, out: &mut File, target: &Path) -> Result<()> {
        let written = self.write_to(out, target).await;
        let flushed = out.flush().await.map_err(wrap_io_err!(target, "flush"));
        written.and(flushed)
    }

    async fn write_to(&self, out: &mut File, target: &Path) -> Result<()> {
        out.write_all(&ContainerHeader::CURRENT.to_bytes())
            .await
            .map_err(wrap_io_err!(target, "write header"))?;

        // First pass: the metadata table, in one write.
        let mut files = Vec::new();
        let mut table = String::new();
        for path in &self.paths {
            let metadata = fs::metadata(path)
                .await
                .map_err(wrap_io_err!(path, "stat"))?;
            if metadata.is_dir() {
                continue;
            }
            grammar::encode_record(&mut table, &base_name(path)?, metadata.len())?;
            files.push((path, metadata.len()));
        }
        table.push_str(grammar::END_MARKER);
        debug!(
            "{}: {} records, table is {} bytes",
            target.display(),
            files.len(),
            table.len()
        );
        out.write_all(table.as_bytes())
            .await
            .map_err(wrap_io_err!(target, "write metadata"))?;

        // Second pass: content, in exactly the same order as the table.
        let mut buf = vec![0u8; PACK_BUF_SIZE];
        for (path, expected) in files {
            pack_file(path, expected, out, target, &mut buf).await?;
        }

        Ok(())
    }
}

async fn create(target: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .await
        .map_err(wrap_io_err!(target, "create"))
}

/// Append the content of `path` to `out`; it must still be `expected` bytes
/// long, the size already written to the table.
async fn pack_file(
    path: &Path,
    expected: u64,
    out: &mut File,
    out_path: &Path,
    buf: &mut [u8],
) -> Result<u64> {
    let mut input = File::open(path)
        .await
        .map_err(wrap_io_err!(path, "open"))?;
    let copied = copy_file(&mut input, path, out, out_path, buf).await?;
    if copied != expected {
        return Err(Error::LengthMismatch {
            path: path.to_path_buf(),
            expected,
            actual: copied,
        });
    }
    info!("packed {} ({copied} bytes)", path.display());
    Ok(copied)
}

async fn copy_file(
    input: &mut File,
    input_path: &Path,
    out: &mut File,
    out_path: &Path,
    buf: &mut [u8],
) -> Result<u64> {
    let mut total = 0u64;
    loop {
        let n = input
            .read(buf)
            .await
            .map_err(wrap_io_err!(input_path, "read"))?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])
            .await
            .map_err(wrap_io_err!(out_path, "write"))?;
        total += n as u64;
    }
    Ok(total)
}

/// The name recorded in the table: the last path component only.
fn base_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::UnencodableName(path.display().to_string()))
}
