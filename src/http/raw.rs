//! Raw access to a connection's byte stream.
//!
//! A handler that frames its own response (large files) takes the transport
//! over through [`Exchange::take_over`] and pushes bytes with [`RawTransport`]
//! instead of sending a [`Response`].
//!
//! [`Exchange::take_over`]: crate::http::exchange::Exchange::take_over
//! [`Response`]: crate::http::response::Response

use std::io;

use tokio::net::TcpStream;

/// Result of one non-blocking push attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The transport took this many bytes (at least one).
    Accepted(usize),
    /// No capacity right now; nothing was taken.
    WouldBlock,
}

impl PushOutcome {
    pub fn accepted(&self) -> usize {
        match self {
            PushOutcome::Accepted(n) => *n,
            PushOutcome::WouldBlock => 0,
        }
    }
}

/// Non-blocking write primitive over the raw connection.
///
/// `Err` is a hard transport failure; backpressure is `Ok(WouldBlock)`.
pub trait RawTransport {
    fn try_push(&mut self, buf: &[u8]) -> io::Result<PushOutcome>;
}

impl RawTransport for TcpStream {
    fn try_push(&mut self, buf: &[u8]) -> io::Result<PushOutcome> {
        if buf.is_empty() {
            return Ok(PushOutcome::Accepted(0));
        }
        match self.try_write(buf) {
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "peer stopped accepting data",
            )),
            Ok(n) => Ok(PushOutcome::Accepted(n)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(PushOutcome::WouldBlock),
            Err(e) => Err(e),
        }
    }
}
