// src/core/mod.rs

//! The central module containing the protocol, filesystem access and shared
//! state used by every session.

pub mod directory;
pub mod errors;
pub mod protocol;
pub mod state;

pub use errors::FtServeError;
pub use protocol::{Command, Response, Verb};
