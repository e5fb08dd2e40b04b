use std::sync::Arc;

use clap::Parser;
use photo_server::{Cli, PhotoServer, SimulatedCamera};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().compact())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,photo_server=debug,photo_core=debug")),
        )
        .init();

    let cli = Cli::parse();
    let camera = Arc::new(SimulatedCamera::new(cli.simulation()));
    let server = PhotoServer::new(cli.server_config(), camera);

    let mut status = server.status();
    tokio::spawn(async move {
        while let Some(snapshot) = status.changed().await {
            info!(running = snapshot.running, "{}", snapshot.status_text);
        }
    });

    let addr = server.start().await?;
    info!("try: curl http://{addr}/api/photo");

    shutdown_signal().await;
    server.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}
