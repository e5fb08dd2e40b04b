//! End-to-end tests against a live listener on an ephemeral port.
//!
//! Requests are written as raw bytes over `TcpStream` so the exact wire format
//! (status line, headers, Content-Length, close) is what gets checked.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use photo_core::{PhotoEnvelope, ServerState, StatusEnvelope};
use photo_server::{PhotoServer, ServerConfig, ServerError, SimulatedCamera, SimulationConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

struct RawResponse {
    status: u16,
    head: String,
    body: Vec<u8>,
}

impl RawResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.head.split("\r\n").skip(1).find_map(|line| {
            let (key, value) = line.split_once(": ")?;
            key.eq_ignore_ascii_case(name).then_some(value)
        })
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

fn camera(silent: bool) -> Arc<SimulatedCamera> {
    Arc::new(SimulatedCamera::new(SimulationConfig {
        capture_delay: Duration::from_millis(50),
        activation_delay: Duration::from_millis(10),
        silent,
    }))
}

fn config(port: u16, photo_timeout: Duration) -> ServerConfig {
    ServerConfig {
        port,
        photo_timeout,
        ..ServerConfig::default()
    }
}

async fn start(silent: bool, photo_timeout: Duration) -> (PhotoServer, SocketAddr) {
    let server = PhotoServer::new(config(0, photo_timeout), camera(silent));
    let addr = server.start().await.unwrap();
    (server, addr)
}

async fn send(addr: SocketAddr, raw: &[u8]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();

    let split = out
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has a header terminator");
    let head = String::from_utf8(out[..split].to_vec()).unwrap();
    let status = head.split(' ').nth(1).unwrap().parse().unwrap();
    RawResponse {
        status,
        head,
        body: out[split + 4..].to_vec(),
    }
}

async fn get(addr: SocketAddr, path: &str) -> RawResponse {
    send(addr, format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\n\r\n").as_bytes()).await
}

// --- simple routes ---

#[tokio::test]
async fn api_status_reports_running_port() {
    let (server, addr) = start(false, Duration::from_secs(5)).await;

    let resp = get(addr, "/api/status").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Type"), Some("application/json"));
    let envelope: StatusEnvelope = serde_json::from_slice(&resp.body).unwrap();
    assert_eq!(envelope.status, "running");
    assert_eq!(envelope.port, Some(addr.port()));

    server.stop().await;
}

#[tokio::test]
async fn html_pages() {
    let (server, addr) = start(false, Duration::from_secs(5)).await;

    for path in ["/", "/status"] {
        let resp = get(addr, path).await;
        assert_eq!(resp.status, 200, "{path}");
        assert_eq!(resp.header("Content-Type"), Some("text/html; charset=utf-8"));
    }
    let status_page = String::from_utf8(get(addr, "/status").await.body).unwrap();
    assert!(status_page.contains(&format!("Server running on port {}", addr.port())));

    server.stop().await;
}

#[tokio::test]
async fn status_line_and_headers_are_exact() {
    let (server, addr) = start(false, Duration::from_secs(5)).await;

    let resp = get(addr, "/unknown").await;
    assert!(resp.head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert_eq!(resp.header("Connection"), Some("close"));
    let declared: usize = resp.header("Content-Length").unwrap().parse().unwrap();
    assert_eq!(declared, resp.body.len());
    assert!(String::from_utf8(resp.body).unwrap().contains("404"));

    server.stop().await;
}

#[tokio::test]
async fn post_to_known_path_is_404() {
    let (server, addr) = start(false, Duration::from_secs(5)).await;
    let resp = send(addr, b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n").await;
    assert_eq!(resp.status, 404);
    server.stop().await;
}

#[tokio::test]
async fn garbage_is_400() {
    let (server, addr) = start(false, Duration::from_secs(5)).await;
    let resp = send(addr, b"GARBAGE\r\n\r\n").await;
    assert_eq!(resp.status, 400);
    assert!(resp.body.is_empty());
    server.stop().await;
}

// --- photo ---

#[tokio::test]
async fn photo_returns_base64_jpeg() {
    let (server, addr) = start(false, Duration::from_secs(5)).await;

    let resp = get(addr, "/api/photo").await;
    assert_eq!(resp.status, 200);
    let envelope: PhotoEnvelope = serde_json::from_slice(&resp.body).unwrap();
    assert_eq!(envelope.status, "success");
    assert_eq!(envelope.format, "jpeg");
    let image = BASE64.decode(&envelope.image).unwrap();
    assert_eq!(image.len(), envelope.size);
    assert_eq!(&image[..2], &[0xff, 0xd8]);

    server.stop().await;
}

#[tokio::test]
async fn photo_times_out_when_camera_is_silent() {
    let (server, addr) = start(true, Duration::from_millis(300)).await;

    let started = std::time::Instant::now();
    let resp = get(addr, "/api/photo").await;
    assert!(started.elapsed() >= Duration::from_millis(300));

    assert_eq!(resp.status, 500);
    let body = resp.json();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("timeout"));
    assert!(body["timestamp"].is_string());

    server.stop().await;
}

#[tokio::test]
async fn concurrent_photo_requests_all_succeed() {
    let (server, addr) = start(false, Duration::from_secs(5)).await;

    let (a, b, c) = tokio::join!(get(addr, "/api/photo"), get(addr, "/api/photo"), get(addr, "/api/status"));
    assert_eq!(a.status, 200);
    assert_eq!(b.status, 200);
    assert_eq!(c.status, 200);

    server.stop().await;
}

// --- lifecycle ---

#[tokio::test]
async fn start_and_stop_are_idempotent() {
    let server = PhotoServer::new(config(0, Duration::from_secs(5)), camera(false));
    let watcher = server.status();

    server.stop().await;
    assert_eq!(server.state(), ServerState::Stopped);
    assert!(!watcher.has_changed());

    let addr = server.start().await.unwrap();
    assert_eq!(server.start().await.unwrap(), addr);
    assert!(watcher.snapshot().running);

    server.stop().await;
    server.stop().await;
    assert!(!watcher.snapshot().running);
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn bind_failure_then_retry() {
    let occupant = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupant.local_addr().unwrap().port();

    let server = PhotoServer::new(config(port, Duration::from_secs(5)), camera(false));
    assert!(matches!(server.start().await, Err(ServerError::Bind(_))));
    let snapshot = server.status().snapshot();
    assert!(!snapshot.running);
    assert!(snapshot.status_text.starts_with("Server failed"));

    drop(occupant);
    let addr = server.start().await.unwrap();
    assert_eq!(addr.port(), port);
    assert_eq!(server.state(), ServerState::Running { port });

    server.stop().await;
}

#[tokio::test]
async fn stop_aborts_in_flight_capture() {
    let (server, addr) = start(true, Duration::from_secs(60)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /api/photo HTTP/1.1\r\n\r\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.stop().await;

    let mut out = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut out)).await;
    assert!(read.is_ok(), "connection should be closed promptly");
    assert!(out.is_empty(), "no response after abort");
}

#[tokio::test]
async fn connection_errors_do_not_affect_listener() {
    let (server, addr) = start(false, Duration::from_secs(5)).await;

    // Connect and hang up without sending anything.
    drop(TcpStream::connect(addr).await.unwrap());
    let mut half = TcpStream::connect(addr).await.unwrap();
    half.write_all(b"GET /api/sta").await.unwrap();
    drop(half);

    assert_eq!(get(addr, "/api/status").await.status, 200);
    assert!(server.state().is_running());

    server.stop().await;
}

// --- through a real HTTP client ---

#[test]
fn http_client_round_trip() {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let server = PhotoServer::new(config(0, Duration::from_secs(5)), camera(false));
            tx.send(server.start().await.unwrap()).unwrap();
            std::future::pending::<()>().await;
        });
    });
    let addr = rx.recv().unwrap();

    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut resp = agent.get(&format!("http://{addr}/api/photo")).call().unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let envelope: PhotoEnvelope = serde_json::from_str(&resp.body_mut().read_to_string().unwrap()).unwrap();
    assert_eq!(envelope.status, "success");

    let resp = agent.get(&format!("http://{addr}/nope")).call().unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
