//! Publish/subscribe for the listener's lifecycle state.
//!
//! The listener is the only writer. Observers (a UI, the status routes, the
//! binary's log line) hold a [`StatusWatcher`] and only ever read.

use photo_core::{ServerState, StatusSnapshot};
use tokio::sync::watch;
use tracing::{debug, warn};

pub struct StatusPublisher {
    tx: watch::Sender<ServerState>,
}

impl StatusPublisher {
    /// Starts in `Stopped`.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ServerState::Stopped);
        Self { tx }
    }

    pub fn current(&self) -> ServerState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> StatusWatcher {
        StatusWatcher {
            rx: self.tx.subscribe(),
        }
    }

    /// Move to `next` if the lifecycle allows it. Returns whether observers
    /// were notified; publishing the current state again is a silent no-op.
    pub(crate) fn publish(&self, next: ServerState) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            if !state.can_transition_to(&next) {
                warn!(from = ?state, to = ?next, "ignoring invalid server state transition");
                return false;
            }
            debug!(from = ?state, to = ?next, "server state changed");
            *state = next;
            true
        })
    }
}

impl Default for StatusPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only handle on the server status.
#[derive(Clone)]
pub struct StatusWatcher {
    rx: watch::Receiver<ServerState>,
}

impl StatusWatcher {
    pub fn state(&self) -> ServerState {
        self.rx.borrow().clone()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.rx.borrow().snapshot()
    }

    /// Whether a change has been published since the last `changed`.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next change. `None` once the server has been dropped.
    pub async fn changed(&mut self) -> Option<StatusSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().snapshot())
    }
}
