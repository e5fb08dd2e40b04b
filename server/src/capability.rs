//! The camera as seen by the server.
//!
//! # Design
//! The hardware driver is an external collaborator. The server only needs to
//! know whether it is active, how to activate it, how to ask for a capture,
//! and where capture results show up. Results arrive on a shared broadcast
//! stream rather than as a return value from `trigger_capture`, so every
//! subscriber sees every event and must pick out the first one it receives.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::broadcast;

/// One event emitted by the camera after a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Raw image data in whatever container the device produces.
    Photo(Bytes),
    /// The device failed to take the picture.
    Error(String),
}

#[async_trait]
pub trait CaptureCapability: Send + Sync {
    fn is_active(&self) -> bool;

    /// Bring the device to the active state. Must finish before a trigger.
    async fn activate(&self) -> anyhow::Result<()>;

    /// Ask for a capture. Fire-and-forget; the result arrives on `events()`.
    fn trigger_capture(&self);

    /// New subscription to the shared, unbounded event stream. Each call
    /// returns an independent receiver that only sees events sent after it
    /// was created.
    fn events(&self) -> broadcast::Receiver<CaptureEvent>;
}
