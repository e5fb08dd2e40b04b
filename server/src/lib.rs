//! Embedded photo server.
//!
//! # Overview
//! A small HTTP/1.x server bound to localhost that serves a status page, a
//! JSON status endpoint, and `/api/photo`, which triggers the camera and
//! returns the picture as base64 JPEG. Request parsing, routing and
//! response building live in `photo-core`; this crate owns the sockets, the
//! runtime, and the camera.
//!
//! # Design
//! - [`PhotoServer`] owns the listener and the lifecycle state. `start` and
//!   `stop` are idempotent; state changes are pushed to [`StatusWatcher`]s.
//! - Every accepted connection runs in its own task and answers exactly one
//!   request.
//! - [`CaptureCoordinator`] races the camera's first capture event against
//!   a deadline with `select!`. The losing branch is dropped, so no
//!   subscription or timer outlives the request.
//! - The camera is abstracted behind [`CaptureCapability`];
//!   [`SimulatedCamera`] stands in when no driver is attached.

pub mod camera;
pub mod capability;
pub mod capture;
pub mod config;
pub mod connection;
pub mod error;
pub mod server;
pub mod status;

pub use camera::{SimulatedCamera, SimulationConfig};
pub use capability::{CaptureCapability, CaptureEvent};
pub use capture::{CaptureCoordinator, Subscription, DEFAULT_PHOTO_TIMEOUT, JPEG_QUALITY};
pub use config::{Cli, ServerConfig, DEFAULT_PORT};
pub use error::{CaptureError, ServerError};
pub use server::PhotoServer;
pub use status::{StatusPublisher, StatusWatcher};
