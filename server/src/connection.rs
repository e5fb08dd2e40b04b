//! Per-connection request lifecycle.
//!
//! A connection is read until its request line is buffered, dispatched,
//! answered with exactly one response, and closed. Header lines still in
//! flight are drained for a short while after the response goes out so the
//! close does not reset the socket under the client.
//! There is no keep-alive and nothing is read while a capture is running.
//! Any I/O error ends this connection only.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use chrono::Utc;
use photo_core::{
    head_complete, parse_request_line, response, router, Dispatch, HttpResponse, ParseError, ParseStatus,
    RequestLine, StatusReport,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::capability::CaptureCapability;
use crate::capture::CaptureCoordinator;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::status::StatusWatcher;

/// Stop draining header lines after this many bytes.
const MAX_HEAD_BYTES: usize = 16 * 1024;

/// Upper bound on the post-response header drain.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Everything a connection needs, shared by all connections of one listener.
pub struct ConnectionContext {
    pub coordinator: CaptureCoordinator,
    pub camera: Arc<dyn CaptureCapability>,
    pub status: StatusWatcher,
    pub read_timeout: Duration,
    pub max_request_line: usize,
}

impl ConnectionContext {
    pub fn new(camera: Arc<dyn CaptureCapability>, status: StatusWatcher, config: &ServerConfig) -> Self {
        Self {
            coordinator: CaptureCoordinator::new(camera.clone(), config.photo_timeout),
            camera,
            status,
            read_timeout: config.read_timeout,
            max_request_line: config.max_request_line,
        }
    }
}

enum ReadOutcome {
    Line(RequestLine),
    Malformed(ParseError),
    PeerClosed,
}

/// Serve one request on `stream`, then close it.
///
/// Returns `Ok(())` when the peer went away or timed out before sending a
/// request line; no response is written in that case.
#[instrument(name = "conn", skip_all, fields(%peer))]
pub async fn serve_connection<S>(mut stream: S, peer: SocketAddr, ctx: &ConnectionContext) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let started = Instant::now();
    let mut buf = BytesMut::with_capacity(1024);
    let read = tokio::time::timeout(
        ctx.read_timeout,
        read_request(&mut stream, &mut buf, ctx.max_request_line),
    )
    .await;

    let (target, response) = match read {
        Err(_) => {
            debug!("no request line before read timeout, closing");
            return Ok(());
        }
        Ok(read) => match read? {
            ReadOutcome::PeerClosed => {
                debug!("peer closed before sending a request line");
                return Ok(());
            }
            ReadOutcome::Malformed(err) => {
                debug!(error = %err, "malformed request line");
                (String::from("-"), response::bad_request())
            }
            ReadOutcome::Line(line) => {
                let target = format!("{} {}", line.method.as_str(), line.path.as_str());
                (target, respond(&line, ctx).await)
            }
        },
    };

    stream.write_all(&response.to_bytes()).await?;
    if tokio::time::timeout(DRAIN_TIMEOUT, drain_head(&mut stream, &mut buf)).await.is_err() {
        debug!("header drain timed out");
    }
    stream.shutdown().await?;

    info!(
        request = %target,
        status = response.status(),
        bytes = response.body().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request served"
    );
    Ok(())
}

async fn read_request<S>(stream: &mut S, buf: &mut BytesMut, limit: usize) -> io::Result<ReadOutcome>
where
    S: AsyncRead + Unpin,
{
    loop {
        match parse_request_line(&buf[..], limit) {
            Ok(ParseStatus::Complete(line)) => return Ok(ReadOutcome::Line(line)),
            Ok(ParseStatus::Incomplete) => {}
            Err(err) => return Ok(ReadOutcome::Malformed(err)),
        }
        if stream.read_buf(buf).await? == 0 {
            return Ok(ReadOutcome::PeerClosed);
        }
    }
}

/// Read and discard the rest of the head. Best effort: errors and EOF end it.
async fn drain_head<S>(stream: &mut S, buf: &mut BytesMut)
where
    S: AsyncRead + Unpin,
{
    while !head_complete(&buf[..]) && buf.len() < MAX_HEAD_BYTES {
        match stream.read_buf(buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
    }
}

async fn respond(line: &RequestLine, ctx: &ConnectionContext) -> HttpResponse {
    let report = StatusReport {
        state: ctx.status.state(),
        camera_active: ctx.camera.is_active(),
    };
    match router::dispatch(line, &report, Utc::now()) {
        Dispatch::Ready(response) => response,
        Dispatch::Capture => {
            let outcome = ctx.coordinator.capture().await;
            response::capture_response(&outcome, Utc::now())
        }
    }
}
