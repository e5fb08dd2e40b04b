//! Response builders.
//!
//! # Design
//! Each function returns a complete `HttpResponse`; nothing is written to a
//! socket until the whole response exists. Timestamps are passed in rather
//! than read from the clock so the builders stay deterministic under test.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::http::{content_type, HttpResponse};
use crate::outcome::CaptureOutcome;
use crate::state::StatusReport;
use crate::templates;
use crate::types::{ErrorEnvelope, PhotoEnvelope, StatusEnvelope};

/// Image format reported in the photo envelope.
pub const PHOTO_FORMAT: &str = "jpeg";

/// ISO-8601 timestamp with millisecond precision and a `Z` suffix.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn html(status: u16, body: String) -> HttpResponse {
    HttpResponse::new(status, content_type::HTML, body)
}

/// Serialize `value` as the JSON body of a response.
pub fn json<T: Serialize>(status: u16, value: &T) -> HttpResponse {
    match serde_json::to_vec(value) {
        Ok(body) => HttpResponse::new(status, content_type::JSON, body),
        Err(err) => HttpResponse::new(
            500,
            content_type::JSON,
            format!(r#"{{"status":"error","message":"response serialization failed: {err}"}}"#),
        ),
    }
}

/// 400 with an empty body.
pub fn bad_request() -> HttpResponse {
    HttpResponse::new(400, content_type::HTML, Vec::new())
}

pub fn not_found(path: &str) -> HttpResponse {
    html(404, templates::not_found_page(path))
}

pub fn api_status(report: &StatusReport, at: DateTime<Utc>) -> HttpResponse {
    json(
        200,
        &StatusEnvelope {
            status: report.state.label().to_string(),
            port: report.state.port(),
            camera_active: report.camera_active,
            timestamp: timestamp(at),
        },
    )
}

pub fn api_error(message: impl Into<String>, at: DateTime<Utc>) -> HttpResponse {
    json(
        500,
        &ErrorEnvelope {
            status: "error".to_string(),
            message: message.into(),
            timestamp: timestamp(at),
        },
    )
}

/// Map a capture outcome to 200 + photo envelope or 500 + error envelope.
pub fn capture_response(outcome: &CaptureOutcome, at: DateTime<Utc>) -> HttpResponse {
    match outcome {
        CaptureOutcome::Success(image) => json(
            200,
            &PhotoEnvelope {
                status: "success".to_string(),
                timestamp: timestamp(at),
                image: BASE64.encode(image),
                format: PHOTO_FORMAT.to_string(),
                size: image.len(),
            },
        ),
        failure => api_error(failure.error_message().unwrap_or_default(), at),
    }
}
