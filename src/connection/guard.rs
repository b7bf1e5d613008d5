// src/connection/guard.rs

//! Defines `SessionGuard`, an RAII guard for session accounting.

use crate::core::state::ServerState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Counts a session as active for exactly as long as the guard lives, so the
/// counter is restored on every exit path, including panics inside the task.
pub struct SessionGuard {
    state: Arc<ServerState>,
    session_id: u64,
    addr: SocketAddr,
}

impl SessionGuard {
    pub(crate) fn new(state: Arc<ServerState>, session_id: u64, addr: SocketAddr) -> Self {
        state.stats.session_started();
        Self {
            state,
            session_id,
            addr,
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.stats.session_ended();
        debug!(
            "SessionGuard dropping for session {} ({})",
            self.session_id, self.addr
        );
    }
}
