//! Result of one photo capture attempt.

use std::time::Duration;

/// Produced exactly once per `/api/photo` request and turned into a
/// response by [`crate::response::capture_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Encoded JPEG bytes.
    Success(Vec<u8>),
    /// No capture event arrived before the deadline.
    Timeout { after: Duration },
    /// Activation, the device, or the encode step failed.
    CaptureFailed(String),
    /// The event stream ended before delivering anything.
    NoEventReceived,
}

impl CaptureOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CaptureOutcome::Success(_))
    }

    /// Message for the error envelope; `None` on success.
    pub fn error_message(&self) -> Option<String> {
        match self {
            CaptureOutcome::Success(_) => None,
            CaptureOutcome::Timeout { after } => Some(format!(
                "Photo capture timeout: no image received within {} seconds",
                after.as_secs_f64()
            )),
            CaptureOutcome::CaptureFailed(reason) => Some(format!("Photo capture failed: {reason}")),
            CaptureOutcome::NoEventReceived => {
                Some("Photo capture failed: camera produced no image".to_string())
            }
        }
    }
}
