//! JSON envelopes returned by the `/api/*` routes.
//!
//! # Design
//! Every API body is one of three fixed shapes with a `status` discriminator
//! and an ISO-8601 `timestamp`. They derive `Deserialize` as well so tests
//! and clients can read them back with the same types.

use serde::{Deserialize, Serialize};

/// Body of a successful `/api/photo` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoEnvelope {
    /// Always `"success"`.
    pub status: String,
    pub timestamp: String,
    /// Base64 (standard alphabet, padded) of the encoded image.
    pub image: String,
    pub format: String,
    /// Length of the encoded image in bytes, before base64.
    pub size: usize,
}

/// Body of any failed `/api/*` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// Always `"error"`.
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

/// Body of `/api/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEnvelope {
    /// One of `stopped`, `starting`, `running`, `failed`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub camera_active: bool,
    pub timestamp: String,
}
