use super::ReadAt;
use crate::Result;
use crate::error::wrap_io_err;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Local container file with random access support
pub struct LocalFileReader {
    path: PathBuf,
    file: std::fs::File,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(wrap_io_err!(path, "open"))?;
        let size = file
            .metadata()
            .map_err(wrap_io_err!(path, "stat"))?
            .len();
        Ok(Self {
            path: path.to_path_buf(),
            file,
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_once(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_at(buf, offset)
        }

        #[cfg(not(unix))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            file.read(buf)
        }
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        // A single pread may return short; keep going until the buffer is
        // full or the file ends.
        let mut filled = 0;
        while filled < buf.len() {
            let n = self
                .read_once(offset + filled as u64, &mut buf[filled..])
                .map_err(wrap_io_err!(&self.path, "read"))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    fn size(&self) -> u64 {
        self.size
    }
}
