// src/core/protocol/response.rs

//! Server replies: the `DATA` ready marker and error text on the control
//! connection, raw payloads on the data connection.

use super::transport;
use crate::core::FtServeError;
use crate::core::directory::format_listing;
use bytes::Bytes;
use tokio::io::AsyncWrite;

/// Sent on the control connection when the payload is about to follow on the data connection.
pub const READY_MARKER: &[u8] = b"DATA";

pub const INVALID_COMMAND_MESSAGE: &str = "Invalid command. Only -g and -l are valid commands.\n";
pub const FILE_NOT_FOUND_MESSAGE: &str = "Requested file does not exist.";
pub const NOT_A_FILE_MESSAGE: &str = "Requested file is not a regular file.";
pub const FILE_TOO_LARGE_MESSAGE: &str = "Requested file is too large.";
pub const FILE_UNREADABLE_MESSAGE: &str = "Requested file could not be read.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The `DATA` marker.
    Ready,
    Error(String),
    /// Directory listing text or file contents.
    Payload(Bytes),
}

impl Response {
    /// Produces the (length, message) pair this response is sent as.
    pub fn encode(&self) -> Result<(u32, Bytes), FtServeError> {
        let body = match self {
            Response::Ready => Bytes::from_static(READY_MARKER),
            Response::Error(message) => Bytes::copy_from_slice(message.as_bytes()),
            Response::Payload(bytes) => bytes.clone(),
        };
        let len = u32::try_from(body.len()).map_err(|_| FtServeError::MessageTooLarge {
            size: body.len(),
            max: u32::MAX as usize,
        })?;
        Ok((len, body))
    }

    /// Interprets a message received on the control connection. Anything other
    /// than the exact ready marker is error text.
    pub fn decode_control(bytes: &[u8]) -> Self {
        if bytes == READY_MARKER {
            Response::Ready
        } else {
            Response::Error(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    /// Sends the response as a length header followed by its bytes.
    pub async fn write_to<W>(&self, conn: &mut W) -> Result<(), FtServeError>
    where
        W: AsyncWrite + Unpin,
    {
        let (len, body) = self.encode()?;
        transport::send_length(conn, len).await?;
        transport::send_message(conn, &body).await
    }

    /// The payload size in bytes, zero for control responses.
    pub fn payload_len(&self) -> usize {
        match self {
            Response::Payload(bytes) => bytes.len(),
            _ => 0,
        }
    }
}

pub fn encode_list_response(entries: &[String]) -> Response {
    Response::Payload(Bytes::from(format_listing(entries)))
}

pub fn encode_get_response(contents: Bytes) -> Response {
    Response::Payload(contents)
}

pub fn encode_error(message: impl Into<String>) -> Response {
    Response::Error(message.into())
}
