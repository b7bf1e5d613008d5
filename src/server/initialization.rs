// src/server/initialization.rs

//! Binds the control listener and builds the shared state.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::state::ServerState;
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Initializes all server components before starting the main loop. A bind
/// failure here is a startup error and is returned to the caller.
pub async fn setup(config: Config) -> Result<ServerContext> {
    log_startup_info(&config);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to start server on port {}", config.port))?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read the control listener's address")?;
    info!("Starting server on port {}", local_addr.port());

    Ok(ServerContext {
        state: ServerState::new(config),
        listener,
    })
}

fn log_startup_info(config: &Config) {
    let root = std::fs::canonicalize(&config.root).unwrap_or_else(|_| config.root.clone());
    info!("Serving directory: {}", root.display());
    debug!(
        "Limits: max_message_size={} bytes, linger_timeout={} ms",
        config.max_message_size, config.linger_timeout_ms
    );
}
