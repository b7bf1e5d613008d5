// src/server/connection_loop.rs

//! Contains the main server loop for accepting connections and handling graceful shutdown.

use super::context::ServerContext;
use crate::connection::SessionHandler;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Pause after a failed accept; errors such as EMFILE persist until a session ends.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Accepts control connections until `shutdown` resolves, running each session
/// in its own task and collecting every finished task so none is leaked.
pub async fn run<F>(ctx: ServerContext, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut session_id_counter: u64 = 0;
    let mut session_tasks = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutdown requested, no longer accepting connections.");
                break;
            }

            res = ctx.listener.accept() => {
                match res {
                    Ok((socket, addr)) => {
                        info!("Client connected from {}. Beginning session.", addr);
                        ctx.state.stats.increment_total_sessions();
                        let _ = socket.set_nodelay(true);

                        session_id_counter = session_id_counter.wrapping_add(1);
                        let session_id = session_id_counter;
                        let state = ctx.state.clone();

                        session_tasks.spawn(async move {
                            let handler = SessionHandler::new(socket, addr, state, session_id);
                            if let Err(e) = handler.run().await {
                                if e.is_normal_disconnect() {
                                    debug!("Session {} from {} closed by peer: {}", session_id, addr, e);
                                } else {
                                    warn!("Session {} from {} terminated: {}", session_id, addr, e);
                                }
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                }
            }

            Some(res) = session_tasks.join_next() => {
                if let Err(e) = res
                    && e.is_panic()
                {
                    error!("A session task panicked: {e:?}");
                }
            }
        }
    }

    info!(
        "Shutting down. Aborting {} in-flight sessions.",
        session_tasks.len()
    );
    session_tasks.shutdown().await;
    info!("Server shutdown complete.");
}
