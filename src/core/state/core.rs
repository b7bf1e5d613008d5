// src/core/state/core.rs

//! Defines the central `ServerState` struct, holding all shared server-wide state.

use super::stats::StatsState;
use crate::config::Config;
use std::sync::Arc;

/// The state shared between the acceptor and every session task.
///
/// Sessions never exchange data through it: the configuration is read-only
/// after startup and the statistics are independent atomic counters.
#[derive(Debug)]
pub struct ServerState {
    pub config: Config,
    pub stats: StatsState,
}

impl ServerState {
    /// Wraps a validated configuration into the shared state handle.
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            stats: StatsState::new(),
        })
    }
}
