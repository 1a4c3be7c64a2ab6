use std::future::Future;
use std::io::{self, SeekFrom};
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Files up to this size are sent in one buffered response.
pub const DEFAULT_MIN_SIZE_HINT: u64 = 256 * 1024;

/// How a request will be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryDecision {
    NotFound,
    Buffered(u64),
    Streamed(u64),
}

/// Picks buffered or streamed delivery for a file of `size` bytes.
///
/// # Example
///
/// ```
/// # use quay::files::planner::{decide, DeliveryDecision};
/// assert_eq!(decide(1024, 1024), DeliveryDecision::Buffered(1024));
/// assert_eq!(decide(1025, 1024), DeliveryDecision::Streamed(1025));
/// ```
pub fn decide(size: u64, min_size_hint: u64) -> DeliveryDecision {
    if size <= min_size_hint {
        DeliveryDecision::Buffered(size)
    } else {
        DeliveryDecision::Streamed(size)
    }
}

/// Asynchronous positioned read.
pub trait ChunkSource {
    /// Reads up to `buf.len()` bytes starting at `offset`. `Ok(0)` means end of file.
    fn read_at(
        &mut self,
        buf: &mut [u8],
        offset: u64,
    ) -> impl Future<Output = io::Result<usize>> + Send;
}

/// A file opened for one request, with its size captured at open time.
///
/// The handle closes when this value is dropped.
#[derive(Debug)]
pub struct OpenFile {
    file: File,
    size: u64,
    position: u64,
}

impl OpenFile {
    /// Opens `path` read-only and records its length.
    ///
    /// Directories are refused with `NotFound`; they cannot be listed.
    pub async fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path).await?;
        let metadata = file.metadata().await?;

        if metadata.is_dir() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "path is a directory"));
        }

        Ok(Self {
            file,
            size: metadata.len(),
            position: 0,
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl ChunkSource for OpenFile {
    async fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        if self.position != offset {
            self.position = self.file.seek(SeekFrom::Start(offset)).await?;
        }
        let n = self.file.read(buf).await?;
        self.position += n as u64;
        Ok(n)
    }
}

/// Result of planning: the decision plus the file it applies to.
#[derive(Debug)]
pub enum Planned {
    NotFound(io::Error),
    Buffered(OpenFile),
    Streamed(OpenFile),
}

impl Planned {
    pub fn decision(&self) -> DeliveryDecision {
        match self {
            Planned::NotFound(_) => DeliveryDecision::NotFound,
            Planned::Buffered(file) => DeliveryDecision::Buffered(file.size()),
            Planned::Streamed(file) => DeliveryDecision::Streamed(file.size()),
        }
    }
}

/// Opens the file at `path` and decides how to deliver it.
///
/// Every open or stat failure is `NotFound`; the cause is kept for logging.
pub async fn plan(path: &Path, min_size_hint: u64) -> Planned {
    let file = match OpenFile::open(path).await {
        Ok(file) => file,
        Err(e) => return Planned::NotFound(e),
    };

    if matches!(decide(file.size(), min_size_hint), DeliveryDecision::Buffered(_)) {
        Planned::Buffered(file)
    } else {
        Planned::Streamed(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        let hint = DEFAULT_MIN_SIZE_HINT;
        assert_eq!(decide(0, hint), DeliveryDecision::Buffered(0));
        assert_eq!(decide(hint, hint), DeliveryDecision::Buffered(hint));
        assert_eq!(decide(hint + 1, hint), DeliveryDecision::Streamed(hint + 1));
    }

    #[tokio::test]
    async fn plans_by_size_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("small.bin"), vec![7u8; 16]).unwrap();
        std::fs::write(dir.path().join("large.bin"), vec![7u8; 17]).unwrap();

        let small = plan(&dir.path().join("small.bin"), 16).await;
        let large = plan(&dir.path().join("large.bin"), 16).await;

        assert_eq!(small.decision(), DeliveryDecision::Buffered(16));
        assert_eq!(large.decision(), DeliveryDecision::Streamed(17));
    }

    #[tokio::test]
    async fn missing_files_and_directories_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let missing = plan(&dir.path().join("nope.txt"), 16).await;
        let directory = plan(&dir.path().join("sub"), 16).await;

        assert_eq!(missing.decision(), DeliveryDecision::NotFound);
        assert_eq!(directory.decision(), DeliveryDecision::NotFound);
    }

    #[tokio::test]
    async fn read_at_honours_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digits.txt");
        std::fs::write(&path, b"0123456789").unwrap();
        let mut file = OpenFile::open(&path).await.unwrap();
        let mut buf = [0u8; 4];

        assert_eq!(file.read_at(&mut buf, 6).await.unwrap(), 4);
        assert_eq!(&buf, b"6789");
        assert_eq!(file.read_at(&mut buf, 0).await.unwrap(), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(file.read_at(&mut buf, 10).await.unwrap(), 0);
    }
}
