// src/server/mod.rs

use crate::config::Config;
use anyhow::Result;
use std::future::Future;
use tracing::{error, info};

mod connection_loop;
mod context;
mod initialization;

pub use context::ServerContext;

/// The main server startup function: bind, then accept until SIGINT or SIGTERM.
pub async fn run(config: Config) -> Result<()> {
    let ctx = initialization::setup(config).await?;
    connection_loop::run(ctx, shutdown_signal()).await;
    Ok(())
}

/// Binds the control listener without starting the accept loop.
pub async fn bind(config: Config) -> Result<ServerContext> {
    initialization::setup(config).await
}

/// Runs the accept loop on an already bound context until `shutdown` resolves.
pub async fn serve<F>(ctx: ServerContext, shutdown: F)
where
    F: Future<Output = ()>,
{
    connection_loop::run(ctx, shutdown).await
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => info!("SIGINT received, initiating graceful shutdown."),
                    _ = sigterm.recv() => info!("SIGTERM received, initiating graceful shutdown."),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => error!("Failed to register signal handlers: {}", e),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received, initiating graceful shutdown."),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {}. Running until killed.", e);
            std::future::pending::<()>().await
        }
    }
}
