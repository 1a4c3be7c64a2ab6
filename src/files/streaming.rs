//! Streamed delivery for large files.
//!
//! The handler takes the raw connection over, sends a hand-built `200 OK`
//! head and then pushes the file in chunks of up to [`CHUNK_SIZE`] bytes.
//! Each push is non-blocking; when the peer is not draining, the session
//! sleeps for an interval chosen by its [`AdaptivePacer`] and tries again.
//!
//! The status line goes out before any file byte is read, so a failure
//! later on can only cut the body short. The caller must then close the
//! connection so the peer sees fewer bytes than `Content-Length` promised.

use std::io;
use std::ops::{Deref, DerefMut};

use crate::files::pacer::AdaptivePacer;
use crate::files::planner::ChunkSource;
use crate::http::raw::RawTransport;
use crate::http::response::StatusCode;

pub const CHUNK_SIZE: usize = 1024 * 1024;
pub const CHUNK_ALIGN: usize = 8192;

/// Why a streamed reply stopped early.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("file read failed: {0}")]
    Read(#[source] io::Error),
    #[error("push failed: {0}")]
    Push(#[source] io::Error),
}

/// Zeroed buffer whose start sits on an `align` boundary.
///
/// Owned by one streaming session; it lives across suspension points, so it
/// cannot come from a per-thread pool.
pub struct ChunkBuffer {
    storage: Vec<u8>,
    start: usize,
    len: usize,
}

impl ChunkBuffer {
    pub fn new(len: usize, align: usize) -> Self {
        let storage = vec![0u8; len + align];
        let start = match storage.as_ptr().align_offset(align) {
            offset if offset < align => offset,
            _ => 0,
        };
        Self {
            storage,
            start,
            len,
        }
    }
}

impl Deref for ChunkBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.storage[self.start..self.start + self.len]
    }
}

impl DerefMut for ChunkBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.start..self.start + self.len]
    }
}

/// Status line and headers for a streamed file.
///
/// `Connection: Keep-Alive` is sent regardless; a peer that asked for close is
/// honoured by closing after the body, not by changing this header.
pub fn response_head(size: u64, file_name: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         Connection: Keep-Alive\r\n\
         Content-Length: {size}\r\n\
         Content-Encoding: identity\r\n\
         Content-Disposition: attachment; filename={file_name}\r\n\
         \r\n"
    )
}

/// Pushes all of `buf`, sleeping between attempts that leave bytes unsent.
///
/// Backpressure is retried for as long as it lasts; a hard failure aborts
/// at once.
pub async fn paced_push<T: RawTransport>(
    transport: &mut T,
    pacer: &mut AdaptivePacer,
    buf: &[u8],
) -> io::Result<()> {
    let mut offset = 0;

    while offset < buf.len() {
        let accepted = transport.try_push(&buf[offset..])?.accepted();
        offset += accepted;
        if offset == buf.len() {
            break;
        }

        let wait = pacer.observe(accepted);
        tokio::time::sleep(wait).await;
    }

    Ok(())
}

/// How a streamed reply ended.
#[derive(Debug)]
pub struct StreamReport {
    /// File length advertised in `Content-Length`.
    pub size: u64,
    /// File bytes fully pushed.
    pub sent: u64,
    pub outcome: Result<(), DeliveryError>,
}

impl StreamReport {
    /// Status for the access log. The peer already saw `200 OK` either way.
    pub fn status(&self) -> StatusCode {
        match self.outcome {
            Ok(()) => StatusCode::Ok,
            Err(_) => StatusCode::InternalServerError,
        }
    }

    /// A cut-short body leaves the connection unusable.
    pub fn keep_alive(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn file_error(&self) -> Option<&io::Error> {
        match &self.outcome {
            Err(DeliveryError::Read(e)) => Some(e),
            _ => None,
        }
    }

    pub fn push_error(&self) -> Option<&io::Error> {
        match &self.outcome {
            Err(DeliveryError::Push(e)) => Some(e),
            _ => None,
        }
    }
}

/// State of one streamed reply.
pub struct StreamingSession {
    size: u64,
    offset: u64,
    pacer: AdaptivePacer,
    buffer: ChunkBuffer,
}

impl StreamingSession {
    pub fn new(size: u64) -> Self {
        Self::with_chunk_size(size, CHUNK_SIZE)
    }

    pub fn with_chunk_size(size: u64, chunk_size: usize) -> Self {
        Self {
            size,
            offset: 0,
            pacer: AdaptivePacer::new(),
            buffer: ChunkBuffer::new(chunk_size, CHUNK_ALIGN),
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Sends the head and then the file, chunk by chunk in offset order.
    ///
    /// Reads never go past the advertised size; a file that ends before it
    /// is a read failure.
    pub async fn run<S, T>(
        &mut self,
        source: &mut S,
        transport: &mut T,
        file_name: &str,
    ) -> Result<(), DeliveryError>
    where
        S: ChunkSource,
        T: RawTransport,
    {
        let head = response_head(self.size, file_name);
        paced_push(transport, &mut self.pacer, head.as_bytes())
            .await
            .map_err(DeliveryError::Push)?;

        while self.offset < self.size {
            let want = usize::try_from(self.size - self.offset)
                .map_or(self.buffer.len(), |left| left.min(self.buffer.len()));

            let n = source
                .read_at(&mut self.buffer[..want], self.offset)
                .await
                .map_err(DeliveryError::Read)?;
            if n == 0 {
                return Err(DeliveryError::Read(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "file shrank while streaming",
                )));
            }

            paced_push(transport, &mut self.pacer, &self.buffer[..n])
                .await
                .map_err(DeliveryError::Push)?;
            self.offset += n as u64;

            tracing::debug!(
                file = file_name,
                total = self.size,
                offset = self.offset,
                "Partial reply"
            );
        }

        Ok(())
    }
}

/// Streams `size` bytes of `source` to `transport` as one complete response.
pub async fn stream_file<S, T>(
    source: &mut S,
    transport: &mut T,
    size: u64,
    file_name: &str,
) -> StreamReport
where
    S: ChunkSource,
    T: RawTransport,
{
    let mut session = StreamingSession::new(size);
    let outcome = session.run(source, transport, file_name).await;

    StreamReport {
        size,
        sent: session.offset(),
        outcome,
    }
}
