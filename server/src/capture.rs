//! Capture coordinator: trigger the camera, then wait for the first capture
//! event or the deadline, whichever comes first.
//!
//! # Design
//! Each attempt owns two things: a [`Subscription`] to the camera's shared
//! event stream and a deadline timer. Both are futures raced in one
//! `select!`. The loser is dropped when the `select!` returns, which
//! unsubscribes the receiver or discards the timer, so no waiter can outlive
//! the attempt and the attempt cannot resolve twice. Cancellation is just
//! dropping, so it is idempotent by construction. The same drop happens when
//! the whole request future is aborted (for example on server stop).
//!
//! The subscription is created *before* the trigger is issued so an event
//! emitted immediately after the trigger cannot be missed.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use photo_core::CaptureOutcome;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::capability::{CaptureCapability, CaptureEvent};
use crate::error::CaptureError;

/// How long an attempt waits for a capture event.
pub const DEFAULT_PHOTO_TIMEOUT: Duration = Duration::from_secs(20);

/// Fixed JPEG quality for re-encoded photos.
pub const JPEG_QUALITY: u8 = 80;

/// A scoped, single-use subscription to the capture event stream.
///
/// The receiver unsubscribes from the shared stream when this is dropped.
pub struct Subscription {
    receiver: broadcast::Receiver<CaptureEvent>,
}

impl Subscription {
    pub fn new(receiver: broadcast::Receiver<CaptureEvent>) -> Self {
        Self { receiver }
    }

    /// Wait for the first event this subscription can observe, then release
    /// the subscription. Returns `None` if the stream closes first.
    pub async fn first(mut self) -> Option<CaptureEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "capture subscription lagged behind the event stream");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

/// An in-flight race between the subscription and the deadline.
struct PendingCapture {
    triggered_at: Instant,
    deadline: Instant,
}

impl PendingCapture {
    fn start(timeout: Duration) -> Self {
        let triggered_at = Instant::now();
        Self {
            triggered_at,
            deadline: triggered_at + timeout,
        }
    }

    async fn resolve(self, subscription: Subscription) -> Result<Bytes, CaptureError> {
        tokio::select! {
            // An event that is ready at the same poll as the deadline wins.
            biased;

            event = subscription.first() => {
                debug!(
                    elapsed_ms = self.triggered_at.elapsed().as_millis() as u64,
                    "capture event received"
                );
                match event {
                    Some(CaptureEvent::Photo(raw)) => Ok(raw),
                    Some(CaptureEvent::Error(reason)) => Err(CaptureError::Device(reason)),
                    None => Err(CaptureError::StreamClosed),
                }
            }
            () = tokio::time::sleep_until(self.deadline) => {
                Err(CaptureError::Timeout(self.deadline - self.triggered_at))
            }
        }
    }
}

/// Runs bounded capture attempts against one camera.
///
/// Cheap to clone. Every call to [`capture`](Self::capture) is an
/// independent attempt with its own subscription and timer.
#[derive(Clone)]
pub struct CaptureCoordinator {
    camera: Arc<dyn CaptureCapability>,
    timeout: Duration,
}

impl CaptureCoordinator {
    pub fn new(camera: Arc<dyn CaptureCapability>, timeout: Duration) -> Self {
        Self { camera, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Take one photo. Always resolves exactly once.
    pub async fn capture(&self) -> CaptureOutcome {
        let capture_id = Uuid::new_v4();
        async {
            let started = Instant::now();
            match self.attempt().await {
                Ok(jpeg) => {
                    info!(
                        size = jpeg.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "photo captured"
                    );
                    CaptureOutcome::Success(jpeg)
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "photo capture failed"
                    );
                    err.into()
                }
            }
        }
        .instrument(tracing::info_span!("capture", %capture_id))
        .await
    }

    async fn attempt(&self) -> Result<Vec<u8>, CaptureError> {
        if !self.camera.is_active() {
            debug!("camera inactive, activating");
            match tokio::time::timeout(self.timeout, self.camera.activate()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => return Err(CaptureError::ActivationFailed(format!("{err:#}"))),
                Err(_) => {
                    return Err(CaptureError::ActivationFailed(format!(
                        "camera did not activate within {} seconds",
                        self.timeout.as_secs()
                    )));
                }
            }
        }

        let subscription = Subscription::new(self.camera.events());
        self.camera.trigger_capture();
        let raw = PendingCapture::start(self.timeout).resolve(subscription).await?;

        encode_jpeg(raw).await
    }
}

/// Re-encode off the async workers so a large frame cannot stall accepts.
async fn encode_jpeg(raw: Bytes) -> Result<Vec<u8>, CaptureError> {
    tokio::task::spawn_blocking(move || reencode_jpeg(&raw))
        .await
        .map_err(|err| CaptureError::Encode(format!("encoder task failed: {err}")))?
}

/// Decode a raw capture into a bitmap and encode it as JPEG at [`JPEG_QUALITY`].
pub fn reencode_jpeg(raw: &[u8]) -> Result<Vec<u8>, CaptureError> {
    let decoded = image::load_from_memory(raw)?;
    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), JPEG_QUALITY);
    // JPEG has no alpha channel.
    DynamicImage::ImageRgb8(decoded.to_rgb8()).write_with_encoder(encoder)?;
    Ok(jpeg)
}
