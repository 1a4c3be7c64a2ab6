use std::collections::HashMap;

/// Request method.
///
/// Only `GET` is served; `HEAD` is recognised so it can be answered with 501,
/// and every other token is carried verbatim in `Other` so it can be rejected
/// with 405 and still show up by name in the access log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    OPTIONS,
    PATCH,
    Other(String),
}

const KNOWN_METHODS: [(Method, &str); 7] = [
    (Method::GET, "get"),
    (Method::HEAD, "head"),
    (Method::POST, "post"),
    (Method::PUT, "put"),
    (Method::DELETE, "delete"),
    (Method::OPTIONS, "options"),
    (Method::PATCH, "patch"),
];

/// A parsed request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Raw request target, query and fragment included (e.g. "/a/b.txt?x=1").
    pub target: String,
    pub version: String,
    pub headers: HashMap<String, String>,
    /// Consumed so the next request on the connection parses cleanly; never used.
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    target: Option<String>,
    headers: HashMap<String, String>,
}

impl Method {
    /// Parses a method token, ignoring case. Unknown tokens become `Other`.
    ///
    /// ```
    /// # use quay::http::request::Method;
    /// assert_eq!(Method::parse("get"), Method::GET);
    /// assert_eq!(Method::parse("PROPFIND"), Method::Other("PROPFIND".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        KNOWN_METHODS
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map_or_else(|| Method::Other(s.to_string()), |(m, _)| m.clone())
    }

    /// Lowercase name used in log lines; `Other` tokens are logged as received.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Other(token) => token,
            known => KNOWN_METHODS
                .iter()
                .find(|(m, _)| m == known)
                .map_or("", |(_, name)| name),
        }
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            target: self.target.ok_or("target missing")?,
            version: "HTTP/1.1".to_string(),
            headers: self.headers,
            body: Vec::new(),
        })
    }
}

impl Request {
    /// Header value by name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The request URI, or `None` when the request line carried an empty target.
    pub fn uri(&self) -> Option<&str> {
        if self.target.is_empty() {
            None
        } else {
            Some(&self.target)
        }
    }

    /// Whether the connection may stay open after the reply.
    ///
    /// An explicit `Connection: close` or `Connection: keep-alive` wins. Otherwise
    /// HTTP/1.1 defaults to keep-alive and HTTP/1.0 to close.
    pub fn keep_alive(&self) -> bool {
        match self.header("Connection") {
            Some(v) if v.eq_ignore_ascii_case("close") => false,
            Some(v) if v.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.version != "HTTP/1.0",
        }
    }
}
