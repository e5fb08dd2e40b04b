//! Error types for the listener and the capture coordinator.

use std::time::Duration;

use photo_core::CaptureOutcome;

/// Listener and connection errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ways a capture attempt can fail. Each maps to one `CaptureOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("camera activation failed: {0}")]
    ActivationFailed(String),

    #[error("camera reported an error: {0}")]
    Device(String),

    #[error("capture event stream closed")]
    StreamClosed,

    #[error("no capture event within {0:?}")]
    Timeout(Duration),

    #[error("image encoding failed: {0}")]
    Encode(String),
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::Encode(err.to_string())
    }
}

impl From<CaptureError> for CaptureOutcome {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::Timeout(after) => CaptureOutcome::Timeout { after },
            CaptureError::StreamClosed => CaptureOutcome::NoEventReceived,
            other => CaptureOutcome::CaptureFailed(other.to_string()),
        }
    }
}
