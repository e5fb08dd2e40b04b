//! Listener lifecycle: bind, accept, spawn one task per connection, stop.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::capability::CaptureCapability;
use crate::config::ServerConfig;
use crate::connection::{serve_connection, ConnectionContext};
use crate::error::ServerError;
use crate::status::{StatusPublisher, StatusWatcher};
use photo_core::ServerState;

/// The embedded photo server.
///
/// `start` and `stop` are idempotent and may be called from any task. The
/// lifecycle state is published through [`PhotoServer::status`].
pub struct PhotoServer {
    config: ServerConfig,
    camera: Arc<dyn CaptureCapability>,
    status: Arc<StatusPublisher>,
    running: Mutex<Option<RunningListener>>,
}

struct RunningListener {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PhotoServer {
    pub fn new(config: ServerConfig, camera: Arc<dyn CaptureCapability>) -> Self {
        Self {
            config,
            camera,
            status: Arc::new(StatusPublisher::new()),
            running: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn status(&self) -> StatusWatcher {
        self.status.subscribe()
    }

    pub fn state(&self) -> ServerState {
        self.status.current()
    }

    /// Address of the bound socket while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        let running = self.running.lock().await;
        running
            .as_ref()
            .filter(|listener| !listener.task.is_finished())
            .map(|listener| listener.local_addr)
    }

    /// Bind and start accepting. A no-op returning the bound address when
    /// already running. A bind failure leaves the server in `Failed`; calling
    /// `start` again retries.
    pub async fn start(&self) -> Result<SocketAddr, ServerError> {
        let mut running = self.running.lock().await;
        if let Some(listener) = running.as_ref() {
            if !listener.task.is_finished() {
                debug!(addr = %listener.local_addr, "start ignored, already running");
                return Ok(listener.local_addr);
            }
        }
        // The accept loop may have died on its own; forget it.
        running.take();

        self.status.publish(ServerState::Starting);
        let (listener, local_addr) = match self.bind().await {
            Ok(bound) => bound,
            Err(err) => {
                error!(error = %err, "server failed to start");
                self.status.publish(ServerState::Failed {
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        let ctx = Arc::new(ConnectionContext::new(
            self.camera.clone(),
            self.status.subscribe(),
            &self.config,
        ));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        self.status.publish(ServerState::Running {
            port: local_addr.port(),
        });
        let task = tokio::spawn(accept_loop(listener, ctx, shutdown_rx, self.status.clone()));
        info!(addr = %local_addr, "photo server listening");

        *running = Some(RunningListener {
            local_addr,
            shutdown: shutdown_tx,
            task,
        });
        Ok(local_addr)
    }

    /// Stop accepting, abort in-flight connections, and publish `Stopped`.
    /// A no-op when already stopped.
    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        if let Some(listener) = running.take() {
            let _ = listener.shutdown.send(());
            if let Err(err) = listener.task.await {
                warn!(error = %err, "accept loop ended abnormally");
            }
            info!(addr = %listener.local_addr, "photo server stopped");
        }
        self.status.publish(ServerState::Stopped);
    }

    async fn bind(&self) -> Result<(TcpListener, SocketAddr), ServerError> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await.map_err(ServerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ServerError::Bind)?;
        Ok((listener, local_addr))
    }
}

async fn accept_loop(
    listener: TcpListener,
    ctx: Arc<ConnectionContext>,
    mut shutdown: oneshot::Receiver<()>,
    status: Arc<StatusPublisher>,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            // Fires on stop, or when the server handle is dropped.
            _ = &mut shutdown => break,

            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(err) = joined {
                    if err.is_panic() {
                        error!(error = %err, "connection task panicked");
                    }
                }
            }

            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let ctx = ctx.clone();
                    connections.spawn(async move {
                        if let Err(err) = serve_connection(stream, peer, &ctx).await {
                            debug!(%peer, error = %err, "connection closed with error");
                        }
                    });
                }
                Err(err) if is_connection_error(&err) => {
                    debug!(error = %err, "accept failed for one connection");
                }
                Err(err) => {
                    error!(error = %err, "listener failed, stopping");
                    status.publish(ServerState::Stopped);
                    break;
                }
            },
        }
    }

    if !connections.is_empty() {
        debug!(in_flight = connections.len(), "aborting in-flight connections");
    }
    connections.shutdown().await;
}

/// Accept errors that concern a single pending connection, not the listener.
fn is_connection_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}
