//! HTTP protocol implementation.
//!
//! A small HTTP/1.1 server layer with support for keep-alive connections and
//! for handlers that frame their own responses.
//!
//! # Architecture
//!
//! - **`connection`**: The connection handler implementing the request-response state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and parsing utilities
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes structured responses to the client
//! - **`exchange`**: Per-request reply handle: structured reply or raw takeover
//! - **`raw`**: Non-blocking push primitive used after a raw takeover
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received          (malformed → Writing 400, then Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Handler replies, or takes the socket over
//!        └──────┬───────────┘
//!               │ Reply sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close / unanswered / shutdown → Closed
//! ```

pub mod connection;
pub mod exchange;
pub mod parser;
pub mod raw;
pub mod request;
pub mod response;
pub mod writer;
