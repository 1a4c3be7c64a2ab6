//! Quay - static file server
//!
//! Serves files under a root directory over HTTP/1.1. Small files go out in a
//! single buffered response; large ones are streamed in chunks through a
//! non-blocking push loop that backs off while the peer is not draining.

pub mod config;
pub mod files;
pub mod http;
pub mod server;
