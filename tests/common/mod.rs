#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use quay::files::planner::ChunkSource;
use quay::http::raw::{PushOutcome, RawTransport};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

/// One scripted push result.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Take at most this many bytes.
    Accept(usize),
    Block,
    Fail(io::ErrorKind),
}

/// In-memory transport: follows its script, then accepts everything.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<Step>,
    pub written: Vec<u8>,
    pub attempts: usize,
    pub blocks: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl RawTransport for ScriptedTransport {
    fn try_push(&mut self, buf: &[u8]) -> io::Result<PushOutcome> {
        self.attempts += 1;
        let take = match self.script.pop_front() {
            None => buf.len(),
            Some(Step::Accept(max)) => max.min(buf.len()),
            Some(Step::Block) => {
                self.blocks += 1;
                return Ok(PushOutcome::WouldBlock);
            }
            Some(Step::Fail(kind)) => return Err(io::Error::from(kind)),
        };
        self.written.extend_from_slice(&buf[..take]);
        Ok(PushOutcome::Accepted(take))
    }
}

impl AsyncWrite for ScriptedTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.get_mut().written.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// File contents held in memory, optionally failing once reads reach `fail_at`.
#[derive(Debug)]
pub struct MemorySource {
    data: Vec<u8>,
    fail_at: Option<u64>,
    pub reads: usize,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            fail_at: None,
            reads: 0,
        }
    }

    pub fn failing_at(data: Vec<u8>, offset: u64) -> Self {
        Self {
            fail_at: Some(offset),
            ..Self::new(data)
        }
    }
}

impl ChunkSource for MemorySource {
    async fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.reads += 1;
        if self.fail_at.is_some_and(|at| offset >= at) {
            return Err(io::Error::other("simulated read failure"));
        }

        let start = (offset as usize).min(self.data.len());
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }
}

/// Deterministic, non-repeating-looking test payload.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Splits a raw HTTP response into its head text and body bytes.
pub fn split_response(raw: &[u8]) -> (String, &[u8]) {
    let end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has a head");
    let head = String::from_utf8(raw[..end + 4].to_vec()).expect("head is utf-8");
    (head, &raw[end + 4..])
}

/// Value of a header in a response head, ignoring case of the name.
pub fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.split("\r\n").skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}

/// Reads one `Content-Length`-framed response from `stream`.
pub async fn read_response<R: AsyncRead + Unpin>(stream: &mut R) -> io::Result<(String, Vec<u8>)> {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 8192];

    let head_end = loop {
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed before head"));
        }
        raw.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
    let length: usize = header_value(&head, "Content-Length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut body = raw[head_end..].to_vec();
    while body.len() < length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed mid-body"));
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok((head, body))
}
