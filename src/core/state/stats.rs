// src/core/state/stats.rs

//! Contains state definitions and logic for server statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Session counters shared by the acceptor and every session task.
#[derive(Debug)]
pub struct StatsState {
    /// The total number of control connections accepted since startup.
    total_sessions: AtomicU64,
    /// Sessions whose task is currently running.
    active_sessions: AtomicU64,
    /// Sessions that reached a normal protocol outcome (including error replies).
    completed_sessions: AtomicU64,
    /// Sessions that ended on a transport or data-listener failure.
    failed_sessions: AtomicU64,
    /// Payload bytes written to data connections.
    bytes_sent: AtomicU64,
}

impl Default for StatsState {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsState {
    /// Creates a new `StatsState` with zeroed counters.
    pub fn new() -> Self {
        Self {
            total_sessions: AtomicU64::new(0),
            active_sessions: AtomicU64::new(0),
            completed_sessions: AtomicU64::new(0),
            failed_sessions: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
        }
    }

    pub fn increment_total_sessions(&self) {
        self.total_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_total_sessions(&self) -> u64 {
        self.total_sessions.load(Ordering::Relaxed)
    }

    pub fn session_started(&self) {
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_ended(&self) {
        self.active_sessions.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get_active_sessions(&self) -> u64 {
        self.active_sessions.load(Ordering::Relaxed)
    }

    pub fn increment_completed_sessions(&self) {
        self.completed_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_completed_sessions(&self) -> u64 {
        self.completed_sessions.load(Ordering::Relaxed)
    }

    pub fn increment_failed_sessions(&self) {
        self.failed_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_failed_sessions(&self) -> u64 {
        self.failed_sessions.load(Ordering::Relaxed)
    }

    pub fn add_bytes_sent(&self, n: u64) {
        self.bytes_sent.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get_bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }
}
