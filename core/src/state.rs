//! Server lifecycle state as seen by observers.

/// Lifecycle of the listener.
///
/// `Stopped -> Starting -> Running` is the only forward path. A failed bind
/// lands in `Failed`, from which another start may be attempted. Any state
/// can return to `Stopped`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServerState {
    #[default]
    Stopped,
    Starting,
    Running { port: u16 },
    Failed { reason: String },
}

impl ServerState {
    pub fn is_running(&self) -> bool {
        matches!(self, ServerState::Running { .. })
    }

    pub fn port(&self) -> Option<u16> {
        match self {
            ServerState::Running { port } => Some(*port),
            _ => None,
        }
    }

    /// Short machine-readable label used in the `/api/status` body.
    pub fn label(&self) -> &'static str {
        match self {
            ServerState::Stopped => "stopped",
            ServerState::Starting => "starting",
            ServerState::Running { .. } => "running",
            ServerState::Failed { .. } => "failed",
        }
    }

    /// Human-readable line for status displays.
    pub fn status_text(&self) -> String {
        match self {
            ServerState::Stopped => "Server stopped".to_string(),
            ServerState::Starting => "Server starting...".to_string(),
            ServerState::Running { port } => format!("Server running on port {port}"),
            ServerState::Failed { reason } => format!("Server failed: {reason}"),
        }
    }

    pub fn can_transition_to(&self, next: &ServerState) -> bool {
        matches!(
            (self, next),
            (_, ServerState::Stopped)
                | (ServerState::Stopped | ServerState::Failed { .. }, ServerState::Starting)
                | (
                    ServerState::Starting,
                    ServerState::Running { .. } | ServerState::Failed { .. }
                )
        )
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            running: self.is_running(),
            status_text: self.status_text(),
        }
    }
}

/// Read-only view pushed to display collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub running: bool,
    pub status_text: String,
}

/// What the status routes need to know at the moment a request is routed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReport {
    pub state: ServerState,
    pub camera_active: bool,
}
