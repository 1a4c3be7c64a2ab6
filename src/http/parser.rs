use std::collections::HashMap;

use crate::http::request::{Method, Request};

/// Largest request head accepted before the connection is rejected.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Largest request body consumed. Bodies are never used; this only bounds
/// how much a connection will buffer to skip over one.
pub const MAX_BODY_SIZE: usize = 64 * 1024;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed request line")]
    InvalidRequest,
    #[error("invalid method token")]
    InvalidMethod,
    #[error("malformed header line")]
    InvalidHeader,
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("request head exceeds {MAX_HEAD_SIZE} bytes")]
    HeadTooLarge,
    #[error("request body exceeds {MAX_BODY_SIZE} bytes")]
    BodyTooLarge,
    #[error("incomplete request")]
    Incomplete,
}

/// Parses one request from the front of `buf`.
///
/// Returns the request and how many bytes it occupied, body included, so the
/// caller can drop them and keep any pipelined bytes that follow.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let head_len = match find_head_end(buf) {
        Some(end) if end > MAX_HEAD_SIZE => return Err(ParseError::HeadTooLarge),
        Some(end) => end,
        None if buf.len() > MAX_HEAD_SIZE => return Err(ParseError::HeadTooLarge),
        None => return Err(ParseError::Incomplete),
    };

    let head = std::str::from_utf8(&buf[..head_len]).map_err(|_| ParseError::InvalidRequest)?;
    let (request_line, header_block) = head.split_once("\r\n").unwrap_or((head, ""));

    let (method, target, version) = parse_request_line(request_line)?;
    let headers = parse_headers(header_block)?;
    let content_length = body_length(&headers)?;
    if content_length > MAX_BODY_SIZE {
        return Err(ParseError::BodyTooLarge);
    }

    let body_start = head_len + HEAD_TERMINATOR.len();
    let consumed = body_start
        .checked_add(content_length)
        .ok_or(ParseError::InvalidContentLength)?;
    if buf.len() < consumed {
        return Err(ParseError::Incomplete);
    }

    let request = Request {
        method,
        target: target.to_string(),
        version: version.to_string(),
        headers,
        body: buf[body_start..consumed].to_vec(),
    };
    Ok((request, consumed))
}

fn parse_request_line(line: &str) -> Result<(Method, &str, &str), ParseError> {
    let mut parts = line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::InvalidRequest);
    };

    if !version.starts_with("HTTP/") {
        return Err(ParseError::InvalidRequest);
    }
    if !method.bytes().all(is_token_byte) {
        return Err(ParseError::InvalidMethod);
    }
    Ok((Method::parse(method), target, version))
}

fn parse_headers(block: &str) -> Result<HashMap<String, String>, ParseError> {
    block
        .split("\r\n")
        .filter(|line| !line.is_empty())
        .map(|line| -> Result<(String, String), ParseError> {
            let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
            Ok((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn body_length(headers: &HashMap<String, String>) -> Result<usize, ParseError> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
        .map_or(Ok(0), |(_, v)| {
            v.parse().map_err(|_| ParseError::InvalidContentLength)
        })
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
}

// RFC 9110 tchar
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
