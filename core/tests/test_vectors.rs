//! Verify parsing and routing against JSON test vectors stored in `test-vectors/`.
//!
//! Each case is a raw request head and the outcome the core must produce:
//! a ready response with a given status, a hand-off to capture, or a request
//! for more bytes. Parse failures are answered the way the server answers
//! them, with `response::bad_request()`.

use chrono::Utc;
use photo_core::{dispatch, parse_request_line, response, Dispatch, ParseStatus, StatusReport, MAX_REQUEST_LINE};

enum Outcome {
    Incomplete,
    Capture,
    Response(photo_core::HttpResponse),
}

fn run(raw: &str) -> Outcome {
    match parse_request_line(raw.as_bytes(), MAX_REQUEST_LINE) {
        Ok(ParseStatus::Incomplete) => Outcome::Incomplete,
        Ok(ParseStatus::Complete(line)) => match dispatch(&line, &StatusReport::default(), Utc::now()) {
            Dispatch::Ready(resp) => Outcome::Response(resp),
            Dispatch::Capture => Outcome::Capture,
        },
        Err(_) => Outcome::Response(response::bad_request()),
    }
}

#[test]
fn request_line_test_vectors() {
    let raw = include_str!("../../test-vectors/request_lines.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected"];

        match (expected["outcome"].as_str().unwrap(), run(case["raw"].as_str().unwrap())) {
            ("incomplete", Outcome::Incomplete) | ("capture", Outcome::Capture) => {}
            ("response", Outcome::Response(resp)) => {
                assert_eq!(
                    u64::from(resp.status()),
                    expected["status"].as_u64().unwrap(),
                    "{name}: status"
                );
                if let Some(content_type) = expected["content_type"].as_str() {
                    assert_eq!(resp.header("Content-Type"), Some(content_type), "{name}: content type");
                }
                let declared: usize = resp.header("Content-Length").unwrap().parse().unwrap();
                assert_eq!(declared, resp.body().len(), "{name}: content length");
            }
            (want, _) => panic!("{name}: expected outcome {want}"),
        }
    }
}

#[test]
fn request_line_is_found_across_chunk_boundaries() {
    let raw = b"GET /api/photo HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let mut buf = Vec::new();
    let mut completed_at = None;

    for (i, byte) in raw.iter().enumerate() {
        buf.push(*byte);
        match parse_request_line(&buf, MAX_REQUEST_LINE).unwrap() {
            ParseStatus::Incomplete => assert!(completed_at.is_none(), "regressed at byte {i}"),
            ParseStatus::Complete(_) => {
                completed_at.get_or_insert(i);
            }
        }
    }

    // Complete exactly when the first CRLF lands.
    assert_eq!(completed_at, Some("GET /api/photo HTTP/1.1\r\n".len() - 1));
}
