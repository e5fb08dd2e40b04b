//! HTTP wire types for the embedded photo server.
//!
//! # Design
//! A request is reduced to the only two things any route looks at: a method
//! and a path, both closed enumerations. Headers and bodies are never
//! interpreted.
//!
//! `HttpResponse` is plain data that is serialized to wire bytes exactly once.
//! Its fields are private and `Content-Length` is derived from the body when
//! the response is built, so the header can never disagree with the payload.

/// Line separator required between the status line, every header, and the
/// blank line that ends the header block.
pub const CRLF: &str = "\r\n";

/// Content types used by the server's responses.
pub mod content_type {
    pub const JSON: &str = "application/json";
    pub const HTML: &str = "text/html; charset=utf-8";
}

/// HTTP method of a request line. Anything else is rejected by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Match a request-line token. Methods are case-sensitive on the wire.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Request target classified against the paths the server knows about.
///
/// `Other` keeps well-formed but unknown paths around so the router can
/// answer them with a 404 instead of the parser rejecting them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPath {
    Root,
    Status,
    ApiStatus,
    ApiPhoto,
    Other(String),
}

impl RequestPath {
    /// Classify a raw request target. The query string, if any, is dropped.
    pub fn classify(target: &str) -> Self {
        let path = target.split_once('?').map_or(target, |(path, _)| path);
        match path {
            "/" => RequestPath::Root,
            "/status" => RequestPath::Status,
            "/api/status" => RequestPath::ApiStatus,
            "/api/photo" => RequestPath::ApiPhoto,
            other => RequestPath::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RequestPath::Root => "/",
            RequestPath::Status => "/status",
            RequestPath::ApiStatus => "/api/status",
            RequestPath::ApiPhoto => "/api/photo",
            RequestPath::Other(path) => path,
        }
    }
}

/// The first line of a request, reduced to method and path.
///
/// Built once per request by the parser and consumed by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: HttpMethod,
    pub path: RequestPath,
}

/// A fully built response, ready to be written to the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    reason: &'static str,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response with `Content-Type`, an exact `Content-Length`, and
    /// `Connection: close`, in that order.
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let headers = vec![
            ("Content-Type".to_string(), content_type.to_string()),
            ("Content-Length".to_string(), body.len().to_string()),
            ("Connection".to_string(), "close".to_string()),
        ];
        Self {
            status,
            reason: reason_phrase(status),
            headers,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Serialize to wire bytes: status line, headers, blank line, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}{CRLF}", self.status, self.reason);
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str(CRLF);
        }
        head.push_str(CRLF);

        let mut out = Vec::with_capacity(head.len() + self.body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

/// Reason phrase for the status codes this server emits.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
