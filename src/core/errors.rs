// src/core/errors.rs

//! Defines the primary error type for the transport, session and client layers.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing every failure a session or client can hit.
///
/// Protocol outcomes such as an unknown command or a missing file are not errors;
/// they are answered on the control connection and the session ends normally.
#[derive(Error, Debug, Clone)]
pub enum FtServeError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Incomplete data in stream")]
    IncompleteData,

    /// The peer closed the stream, or a read or write made no progress.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Message too large: {size} bytes (max: {max} bytes)")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Invalid data port: {0}")]
    InvalidDataPort(u32),

    #[error("Failed to open data listener on port {port}: {reason}")]
    DataListener {
        port: u16,
        reason: Arc<std::io::Error>,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Internal Error: {0}")]
    Internal(String),
}

impl PartialEq for FtServeError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FtServeError::Io(e1), FtServeError::Io(e2)) => e1.to_string() == e2.to_string(),
            (
                FtServeError::MessageTooLarge { size: s1, max: m1 },
                FtServeError::MessageTooLarge { size: s2, max: m2 },
            ) => s1 == s2 && m1 == m2,
            (FtServeError::InvalidDataPort(p1), FtServeError::InvalidDataPort(p2)) => p1 == p2,
            (
                FtServeError::DataListener { port: p1, .. },
                FtServeError::DataListener { port: p2, .. },
            ) => p1 == p2,
            (FtServeError::Protocol(s1), FtServeError::Protocol(s2)) => s1 == s2,
            (FtServeError::Internal(s1), FtServeError::Internal(s2)) => s1 == s2,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl FtServeError {
    /// True for failures that just mean the peer went away.
    pub fn is_normal_disconnect(&self) -> bool {
        match self {
            FtServeError::ConnectionClosed => true,
            FtServeError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for FtServeError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::WriteZero => FtServeError::ConnectionClosed,
            _ => FtServeError::Io(Arc::new(e)),
        }
    }
}
