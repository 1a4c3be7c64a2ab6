use std::future::Future;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::http::exchange::{Exchange, ReplyState};
use crate::http::parser::{parse_http_request, ParseError};
use crate::http::raw::RawTransport;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// Answers one request through its [`Exchange`].
///
/// Implementations must not fail: anything that goes wrong is logged and
/// either answered or left unanswered, in which case the connection closes.
pub trait Handler: Send + Sync + 'static {
    fn handle<T>(
        &self,
        req: &Request,
        exchange: &mut Exchange<'_, T>,
    ) -> impl Future<Output = ()> + Send
    where
        T: RawTransport + AsyncWrite + Unpin + Send;
}

pub struct Connection<H> {
    stream: TcpStream,
    buffer: BytesMut,
    state: ConnectionState,
    handler: Arc<H>,
    shutdown: watch::Receiver<bool>,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

enum ReadOutcome {
    Request(Request),
    Malformed(ParseError),
    Closed,
}

impl<H: Handler> Connection<H> {
    pub fn new(stream: TcpStream, handler: Arc<H>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            handler,
            shutdown,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Reading => match self.read_request().await? {
                    ReadOutcome::Request(req) => ConnectionState::Processing(req),
                    ReadOutcome::Malformed(e) => {
                        tracing::warn!(error = %e, "Rejecting malformed request");
                        let mut response = Response::bad_request();
                        response.set_header("Connection", "close");
                        ConnectionState::Writing(ResponseWriter::new(response), false)
                    }
                    ReadOutcome::Closed => ConnectionState::Closed,
                },

                ConnectionState::Processing(req) => {
                    let mut exchange = Exchange::new(&mut self.stream, req.keep_alive());
                    self.handler.handle(&req, &mut exchange).await;

                    // An unanswered request leaves the peer with nothing to frame on.
                    let keep_alive =
                        exchange.state() != ReplyState::Pending && exchange.keep_alive();

                    if keep_alive && !*self.shutdown.borrow() {
                        ConnectionState::Reading // go back for next request
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if keep_alive {
                        ConnectionState::Reading
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(ReadOutcome::Request(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => return Ok(ReadOutcome::Malformed(e)),
            }

            if *self.shutdown.borrow() {
                return Ok(ReadOutcome::Closed);
            }

            let n = tokio::select! {
                res = self.stream.read_buf(&mut self.buffer) => res?,
                _ = wait_for_shutdown(&mut self.shutdown) => return Ok(ReadOutcome::Closed),
            };

            if n == 0 {
                // Client closed connection
                return Ok(ReadOutcome::Closed);
            }
        }
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        // Sender gone: nobody can ask us to stop any more.
        std::future::pending::<()>().await;
    }
}
