//! Server configuration and the command line that fills it in.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use photo_core::MAX_REQUEST_LINE;

use crate::camera::SimulationConfig;
use crate::capture::DEFAULT_PHOTO_TIMEOUT;
use crate::error::ServerError;

pub const DEFAULT_PORT: u16 = 8010;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind host. Localhost only by default.
    pub bind_host: String,
    /// Port to bind; 0 lets the OS pick one.
    pub port: u16,
    /// How long `/api/photo` waits for a capture event.
    pub photo_timeout: Duration,
    /// How long a connection may take to deliver its request line.
    pub read_timeout: Duration,
    /// Bytes buffered while waiting for the request line before answering 400.
    pub max_request_line: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            photo_timeout: DEFAULT_PHOTO_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_request_line: MAX_REQUEST_LINE,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let ip: IpAddr = self
            .bind_host
            .parse()
            .map_err(|_| ServerError::InvalidAddress(self.bind_host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Embedded HTTP server that takes photos on request.
#[derive(Debug, Parser)]
#[command(name = "photo-server", version, about)]
pub struct Cli {
    /// Address to bind.
    #[arg(long, env = "PHOTO_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PHOTO_SERVER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds `/api/photo` waits for the camera before giving up.
    #[arg(long, env = "PHOTO_TIMEOUT_SECS", default_value_t = DEFAULT_PHOTO_TIMEOUT.as_secs())]
    pub photo_timeout_secs: u64,

    /// Seconds a client has to send its request line.
    #[arg(long, env = "PHOTO_READ_TIMEOUT_SECS", default_value_t = DEFAULT_READ_TIMEOUT.as_secs())]
    pub read_timeout_secs: u64,

    /// Delay before the simulated camera delivers a frame, in milliseconds.
    #[arg(long, env = "PHOTO_SIM_DELAY_MS", default_value_t = 500)]
    pub sim_delay_ms: u64,

    /// Make the simulated camera swallow triggers (exercises the timeout path).
    #[arg(long, env = "PHOTO_SIM_SILENT")]
    pub sim_silent: bool,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_host: self.host.clone(),
            port: self.port,
            photo_timeout: Duration::from_secs(self.photo_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            ..ServerConfig::default()
        }
    }

    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            capture_delay: Duration::from_millis(self.sim_delay_ms),
            silent: self.sim_silent,
            ..SimulationConfig::default()
        }
    }
}
