use tokio::io::AsyncWrite;

use crate::http::raw::RawTransport;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// How far the reply for the current request has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyState {
    /// Nothing sent yet.
    Pending,
    /// A structured response was handed to the writer.
    Responded,
    /// The handler took the transport over and frames the response itself.
    TakenOver,
}

/// One request's view of its connection.
///
/// Offers two mutually exclusive ways to answer: [`reply`](Self::reply) for a
/// structured [`Response`], or [`take_over`](Self::take_over) for raw framing.
/// Whichever is used first commits the request; the other is refused so the
/// two can never interleave bytes on the wire.
pub struct Exchange<'a, T> {
    transport: &'a mut T,
    keep_alive: bool,
    state: ReplyState,
}

impl<'a, T> Exchange<'a, T>
where
    T: RawTransport + AsyncWrite + Unpin,
{
    pub fn new(transport: &'a mut T, keep_alive: bool) -> Self {
        Self {
            transport,
            keep_alive,
            state: ReplyState::Pending,
        }
    }

    /// Sends a structured response and waits until it is fully written.
    ///
    /// Adds `Connection: close` when keep-alive has been turned off.
    pub async fn reply(&mut self, mut response: Response) -> anyhow::Result<()> {
        if self.state != ReplyState::Pending {
            anyhow::bail!("reply already committed ({:?})", self.state);
        }
        if !self.keep_alive {
            response.set_header("Connection", "close");
        }

        self.state = ReplyState::Responded;
        let result = ResponseWriter::new(response)
            .write_to_stream(&mut *self.transport)
            .await;
        if result.is_err() {
            self.keep_alive = false;
        }
        result
    }

    /// Suspends the structured reply path and hands out the raw transport.
    pub fn take_over(&mut self) -> anyhow::Result<&mut T> {
        if self.state == ReplyState::Responded {
            anyhow::bail!("cannot take over after a structured reply");
        }
        self.state = ReplyState::TakenOver;
        Ok(&mut *self.transport)
    }

    pub fn disable_keep_alive(&mut self) {
        self.keep_alive = false;
    }

    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub fn state(&self) -> ReplyState {
        self.state
    }
}
