// src/connection/data_channel.rs

//! Opens the per-request data connection on the port the client negotiated.

use crate::core::FtServeError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

/// Converts the raw integer a client sent into a bindable port. Zero would ask
/// the OS for an arbitrary port the client cannot know, so it is refused.
pub fn validate_port(raw: u32) -> Result<u16, FtServeError> {
    match u16::try_from(raw) {
        Ok(0) | Err(_) => Err(FtServeError::InvalidDataPort(raw)),
        Ok(port) => Ok(port),
    }
}

/// Binds a listener on `host:port`, accepts exactly one connection and drops
/// the listener. A bind failure is reported as `DataListener`.
pub async fn open(host: &str, port: u16) -> Result<(TcpStream, SocketAddr), FtServeError> {
    let listener = TcpListener::bind((host, port))
        .await
        .map_err(|e| FtServeError::DataListener {
            port,
            reason: Arc::new(e),
        })?;
    debug!("Data listener bound on {}:{}", host, port);

    let (stream, addr) = listener.accept().await?;
    let _ = stream.set_nodelay(true);
    Ok((stream, addr))
}
