//! Route table.
//!
//! Dispatch is a match over `(method, path)` pairs. Three routes answer
//! synchronously from a status report; `/api/photo` is handed back to the
//! caller, which owns the async capture.

use chrono::{DateTime, Utc};

use crate::http::{HttpMethod, HttpResponse, RequestLine, RequestPath};
use crate::response;
use crate::state::StatusReport;
use crate::templates;

/// A matched route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    StatusPage,
    ApiStatus,
    ApiPhoto,
}

/// What the connection should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The response is ready to write.
    Ready(HttpResponse),
    /// Run a capture and build the response from its outcome.
    Capture,
}

/// Look up the route for a request line. `None` means 404.
pub fn resolve(line: &RequestLine) -> Option<Route> {
    match (line.method, &line.path) {
        (HttpMethod::Get, RequestPath::Root) => Some(Route::Index),
        (HttpMethod::Get, RequestPath::Status) => Some(Route::StatusPage),
        (HttpMethod::Get, RequestPath::ApiStatus) => Some(Route::ApiStatus),
        (HttpMethod::Get, RequestPath::ApiPhoto) => Some(Route::ApiPhoto),
        _ => None,
    }
}

pub fn dispatch(line: &RequestLine, report: &StatusReport, now: DateTime<Utc>) -> Dispatch {
    match resolve(line) {
        Some(Route::Index) => Dispatch::Ready(response::html(200, templates::index_page())),
        Some(Route::StatusPage) => Dispatch::Ready(response::html(200, templates::status_page(report))),
        Some(Route::ApiStatus) => Dispatch::Ready(response::api_status(report, now)),
        Some(Route::ApiPhoto) => Dispatch::Capture,
        None => Dispatch::Ready(response::not_found(line.path.as_str())),
    }
}
