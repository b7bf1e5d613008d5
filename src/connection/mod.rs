// src/connection/mod.rs

//! Manages the lifecycle of a single client session: command decoding, data
//! port negotiation, the requested operation and the closing of both connections.

pub mod data_channel;
mod guard;
mod handler;
mod session;

pub use guard::SessionGuard;
pub use handler::SessionHandler;
pub use session::{SessionOutcome, SessionPhase, SessionState};
