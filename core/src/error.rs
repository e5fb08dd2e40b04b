//! Error types for request-line parsing.
//!
//! # Design
//! "Not enough bytes yet" is not an error: the parser reports it as
//! `ParseStatus::Incomplete` so the caller keeps reading. Everything here is
//! a request the server will answer with 400 and never retry.

use std::fmt;

/// Reasons a request line is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than two space-separated tokens on the first line.
    MissingTokens,

    /// The method token is not one the server understands.
    UnknownMethod(String),

    /// The request target does not look like an absolute path.
    InvalidPath(String),

    /// The first line is not valid UTF-8.
    InvalidEncoding,

    /// No line separator arrived within the configured limit.
    LineTooLong { limit: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingTokens => write!(f, "request line has fewer than two tokens"),
            ParseError::UnknownMethod(method) => write!(f, "unknown method {method:?}"),
            ParseError::InvalidPath(path) => write!(f, "invalid request target {path:?}"),
            ParseError::InvalidEncoding => write!(f, "request line is not valid UTF-8"),
            ParseError::LineTooLong { limit } => {
                write!(f, "request line exceeds {limit} bytes")
            }
        }
    }
}

impl std::error::Error for ParseError {}
