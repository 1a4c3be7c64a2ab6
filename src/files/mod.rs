//! Static file delivery.
//!
//! A GET request flows through:
//!
//! ```text
//! request target ─▶ path::RequestPath ─▶ planner::plan ─┬─▶ buffered  (size ≤ hint)
//!                                                       ├─▶ streaming (size > hint, paced by pacer)
//!                                                       └─▶ 404
//! ```
//!
//! - **`path`**: lexical normalization of the request target, confined to the root
//! - **`planner`**: opens the file, captures its size, picks the delivery strategy
//! - **`buffered`**: whole-file read into one response
//! - **`streaming`**: raw takeover, hand-built head, chunked non-blocking pushes
//! - **`pacer`**: wait between push attempts, doubled on backpressure and halved on progress
//! - **`service`**: method dispatch and access logging

pub mod buffered;
pub mod pacer;
pub mod path;
pub mod planner;
pub mod service;
pub mod streaming;

pub use path::RequestPath;
pub use planner::{DeliveryDecision, OpenFile};
pub use service::FileService;
