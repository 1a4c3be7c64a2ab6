use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

/// Every status the file server can answer with.
///
/// - `Ok` (200): File delivered
/// - `BadRequest` (400): Malformed request
/// - `NotFound` (404): Missing, unopenable or unsizeable file
/// - `MethodNotAllowed` (405): Any method other than GET or HEAD
/// - `InternalServerError` (500): Read or transport failure during delivery
/// - `NotImplemented` (501): HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
    NotImplemented,
}

impl StatusCode {
    fn parts(self) -> (u16, &'static str) {
        match self {
            StatusCode::Ok => (200, "OK"),
            StatusCode::BadRequest => (400, "Bad Request"),
            StatusCode::NotFound => (404, "Not Found"),
            StatusCode::MethodNotAllowed => (405, "Method Not Allowed"),
            StatusCode::InternalServerError => (500, "Internal Server Error"),
            StatusCode::NotImplemented => (501, "Not Implemented"),
        }
    }

    /// Numeric code, as logged and sent on the status line.
    ///
    /// ```
    /// # use quay::http::response::StatusCode;
    /// assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.parts().0
    }

    pub fn reason_phrase(&self) -> &'static str {
        self.parts().1
    }
}

/// Formats as `"<code> <reason>"`, the tail of a status line.
impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (code, reason) = self.parts();
        write!(f, "{code} {reason}")
    }
}

/// A fully buffered response.
///
/// The body is a [`Bytes`] so a file buffer can be handed over without copying;
/// it stays alive until the writer has finished sending it.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

/// Fluent construction of a [`Response`].
///
/// ```
/// # use quay::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Disposition", "notes.txt")
///     .body(b"hello".to_vec())
///     .build();
/// assert_eq!(response.headers["Content-Length"], "5");
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body. A `Vec<u8>` is taken over without copying.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Finishes the response, filling in `Content-Length` unless one was set.
    pub fn build(mut self) -> Response {
        let len = self.body.len();
        self.headers
            .entry("Content-Length".to_string())
            .or_insert_with(|| len.to_string());

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Adds or replaces a header on an already built response.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    pub fn bad_request() -> Self {
        Self::plain(StatusCode::BadRequest)
    }

    pub fn not_found() -> Self {
        Self::plain(StatusCode::NotFound)
    }

    /// 405 carrying `Allow: GET`.
    pub fn method_not_allowed() -> Self {
        let mut response = Self::plain(StatusCode::MethodNotAllowed);
        response.set_header("Allow", "GET");
        response
    }

    pub fn internal_error() -> Self {
        Self::plain(StatusCode::InternalServerError)
    }

    /// Answers HEAD, so no body.
    pub fn not_implemented() -> Self {
        ResponseBuilder::new(StatusCode::NotImplemented).build()
    }

    // Body is the status line tail, e.g. "404 Not Found".
    fn plain(status: StatusCode) -> Self {
        ResponseBuilder::new(status)
            .body(status.to_string())
            .build()
    }
}
