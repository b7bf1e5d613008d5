// src/connection/session.rs

//! Defines the state carried by a single session between its phases.

use crate::core::{Command, Verb};
use std::fmt;
use std::net::SocketAddr;
use tracing::debug;

/// The phases a session moves through, in order. Every path ends in `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitCommand,
    AwaitDataPort,
    Listing,
    Transferring,
    Rejecting,
    Closed,
}

impl SessionPhase {
    /// Whether moving from `self` to `next` is a legal step.
    pub fn can_advance_to(self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (AwaitCommand, AwaitDataPort)
                | (AwaitCommand, Rejecting)
                | (AwaitDataPort, Listing)
                | (AwaitDataPort, Transferring)
                | (_, Closed)
        ) && self != Closed
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::AwaitCommand => "await-command",
            SessionPhase::AwaitDataPort => "await-data-port",
            SessionPhase::Listing => "listing",
            SessionPhase::Transferring => "transferring",
            SessionPhase::Rejecting => "rejecting",
            SessionPhase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// How a session that did not fail on the transport ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Listed { entries: usize, bytes: usize },
    Sent { filename: String, bytes: usize },
    /// The requested name was not among the directory entries.
    NotFound { filename: String },
    /// The name exists but could not be served; `reason` is the reply sent.
    Unservable { filename: String, reason: String },
    Rejected { token: String },
}

impl SessionOutcome {
    /// Payload bytes written on the data connection.
    pub fn bytes_sent(&self) -> usize {
        match self {
            SessionOutcome::Listed { bytes, .. } | SessionOutcome::Sent { bytes, .. } => *bytes,
            _ => 0,
        }
    }
}

/// Session-local state passed between the state machine's steps.
#[derive(Debug)]
pub struct SessionState {
    pub id: u64,
    pub peer: SocketAddr,
    pub phase: SessionPhase,
    pub verb: Option<Verb>,
    pub data_port: Option<u16>,
    pub command: Option<Command>,
}

impl SessionState {
    pub fn new(id: u64, peer: SocketAddr) -> Self {
        Self {
            id,
            peer,
            phase: SessionPhase::AwaitCommand,
            verb: None,
            data_port: None,
            command: None,
        }
    }

    /// Describes what the client asked for, for the session's closing log line.
    pub fn request_summary(&self) -> String {
        let request = match (&self.command, &self.verb) {
            (Some(Command::Get { filename }), _) => format!("get [{filename}]"),
            (Some(command), _) => command.name().to_string(),
            (None, Some(verb)) => format!("token {:?}", verb.token()),
            (None, None) => "without a command".to_string(),
        };
        match self.data_port {
            Some(port) => format!("{request} via data port {port}"),
            None => request,
        }
    }

    /// Moves to `next`, ignoring steps the state machine does not allow.
    pub(crate) fn advance(&mut self, next: SessionPhase) -> bool {
        if !self.phase.can_advance_to(next) {
            debug!(
                "Session {}: ignoring illegal transition {} -> {}",
                self.id, self.phase, next
            );
            return false;
        }
        debug!("Session {}: {} -> {}", self.id, self.phase, next);
        self.phase = next;
        true
    }
}
