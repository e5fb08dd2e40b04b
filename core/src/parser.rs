//! Request-line parser.
//!
//! Stateless and re-entrant: call it with everything buffered so far for one
//! connection, as many times as needed. It only looks at the first line.

use crate::error::ParseError;
use crate::http::{HttpMethod, RequestLine, RequestPath};

/// Default upper bound on the bytes buffered while waiting for the first line.
pub const MAX_REQUEST_LINE: usize = 8 * 1024;

/// Result of a parse attempt over a partial buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    /// No line separator yet; read more bytes and try again.
    Incomplete,
    Complete(RequestLine),
}

/// Try to parse the request line out of `buf`.
///
/// Unknown paths are not an error; they come back as `RequestPath::Other`
/// for the router to answer with 404.
pub fn parse_request_line(buf: &[u8], limit: usize) -> Result<ParseStatus, ParseError> {
    let end = match find(buf, b"\r\n") {
        Some(end) if end <= limit => end,
        Some(_) => return Err(ParseError::LineTooLong { limit }),
        None if buf.len() > limit => return Err(ParseError::LineTooLong { limit }),
        None => return Ok(ParseStatus::Incomplete),
    };

    let line = std::str::from_utf8(&buf[..end]).map_err(|_| ParseError::InvalidEncoding)?;
    let mut tokens = line.split(' ');
    let (Some(method), Some(target)) = (tokens.next(), tokens.next()) else {
        return Err(ParseError::MissingTokens);
    };

    let method =
        HttpMethod::from_token(method).ok_or_else(|| ParseError::UnknownMethod(method.to_string()))?;
    if !target.starts_with('/') {
        return Err(ParseError::InvalidPath(target.to_string()));
    }

    Ok(ParseStatus::Complete(RequestLine {
        method,
        path: RequestPath::classify(target),
    }))
}

/// True once the blank line ending the header block has been buffered.
pub fn head_complete(buf: &[u8]) -> bool {
    find(buf, b"\r\n\r\n").is_some()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
