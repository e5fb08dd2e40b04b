//! Simulated camera used by the binary when no hardware driver is attached.
//!
//! Triggers are answered with a generated PNG test pattern on the shared
//! broadcast stream after a configurable delay, so the whole capture path
//! (activation, race, re-encode) runs exactly as it would against a device.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::capability::{CaptureCapability, CaptureEvent};

const FRAME_WIDTH: u32 = 320;
const FRAME_HEIGHT: u32 = 240;

#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Time from trigger to frame.
    pub capture_delay: Duration,
    /// Time `activate` takes.
    pub activation_delay: Duration,
    /// Swallow every trigger without emitting anything.
    pub silent: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            capture_delay: Duration::from_millis(500),
            activation_delay: Duration::from_millis(200),
            silent: false,
        }
    }
}

pub struct SimulatedCamera {
    config: SimulationConfig,
    active: AtomicBool,
    frames: AtomicU64,
    events: broadcast::Sender<CaptureEvent>,
}

impl SimulatedCamera {
    pub fn new(config: SimulationConfig) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            config,
            active: AtomicBool::new(false),
            frames: AtomicU64::new(0),
            events,
        }
    }

    /// Stop the session, as a driver would after an idle period.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl CaptureCapability for SimulatedCamera {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    async fn activate(&self) -> anyhow::Result<()> {
        tokio::time::sleep(self.config.activation_delay).await;
        self.active.store(true, Ordering::SeqCst);
        info!("simulated camera active");
        Ok(())
    }

    fn trigger_capture(&self) {
        let frame = self.frames.fetch_add(1, Ordering::SeqCst);
        if self.config.silent {
            debug!(frame, "simulated camera ignoring trigger");
            return;
        }

        let events = self.events.clone();
        let delay = self.config.capture_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let event = match test_pattern(frame) {
                Ok(png) => CaptureEvent::Photo(Bytes::from(png)),
                Err(err) => CaptureEvent::Error(err.to_string()),
            };
            // No subscribers left means the attempt already gave up.
            let delivered = events.send(event).unwrap_or(0);
            debug!(frame, delivered, "simulated frame emitted");
        });
    }

    fn events(&self) -> broadcast::Receiver<CaptureEvent> {
        self.events.subscribe()
    }
}

/// Diagonal gradient that shifts with each frame, encoded as PNG.
fn test_pattern(frame: u64) -> image::ImageResult<Vec<u8>> {
    let shift = (frame % 256) as u32;
    let img = RgbImage::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
        Rgb([
            ((x + shift) % 256) as u8,
            ((y + shift) % 256) as u8,
            ((x + y) / 4 % 256) as u8,
        ])
    });

    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
