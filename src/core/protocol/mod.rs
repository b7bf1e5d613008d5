// src/core/protocol/mod.rs

pub mod command;
pub mod frame;
pub mod response;
pub mod transport;

pub use command::{Command, Verb};
pub use frame::FrameCodec;
pub use response::Response;
