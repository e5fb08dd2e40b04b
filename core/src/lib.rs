//! Request/response core for the embedded photo server.
//!
//! # Overview
//! Parses request lines, routes them, and builds complete responses without
//! touching the network (host-does-IO pattern). The server crate owns the
//! sockets and the capture hardware; everything here is deterministic and
//! testable on plain byte slices.
//!
//! # Design
//! - The parser is stateless: feed it the bytes buffered so far and it
//!   answers `Incomplete`, `Complete(line)` or a `ParseError`.
//! - Routing is a match over closed `(method, path)` enumerations.
//! - `/api/photo` is the only route that is not answered here. The router
//!   returns `Dispatch::Capture` and the caller turns the resulting
//!   `CaptureOutcome` into a response with `response::capture_response`.

pub mod error;
pub mod http;
pub mod outcome;
pub mod parser;
pub mod response;
pub mod router;
pub mod state;
pub mod templates;
pub mod types;

pub use error::ParseError;
pub use http::{HttpMethod, HttpResponse, RequestLine, RequestPath};
pub use outcome::CaptureOutcome;
pub use parser::{head_complete, parse_request_line, ParseStatus, MAX_REQUEST_LINE};
pub use router::{dispatch, resolve, Dispatch, Route};
pub use state::{ServerState, StatusReport, StatusSnapshot};
pub use types::{ErrorEnvelope, PhotoEnvelope, StatusEnvelope};
