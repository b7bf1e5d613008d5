// src/client/mod.rs

//! A client for the two-channel protocol, used by the `ftclient` binary and
//! by end-to-end tests.
//!
//! The request goes out in one burst on the control connection: the command
//! token, the data port, and for a get the filename. The server only opens its
//! data listener after reading the port, so the client keeps retrying the data
//! connection while watching the control connection for an early error reply.

use crate::core::protocol::transport;
use crate::core::protocol::{FrameCodec, Response, Verb};
use crate::core::FtServeError;
use bytes::Bytes;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;
use tracing::debug;

/// Largest control reply the client accepts; control replies are short text.
const MAX_CONTROL_REPLY_LEN: usize = 64 * 1024;

/// Connection settings for one request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub control_port: u16,
    /// The port the server is asked to listen on for the data connection.
    pub data_port: u16,
    pub max_message_size: usize,
    /// How many times to try the data connection before giving up.
    pub connect_attempts: u32,
    pub retry_delay: Duration,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, control_port: u16, data_port: u16) -> Self {
        Self {
            host: host.into(),
            control_port,
            data_port,
            max_message_size: 64 * 1024 * 1024,
            connect_attempts: 100,
            retry_delay: Duration::from_millis(20),
        }
    }
}

/// What the client asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List,
    Get { filename: String },
    /// Sends an arbitrary token; the server answers with an error.
    Raw { token: String },
}

impl Request {
    fn token(&self) -> &str {
        match self {
            Request::List => Verb::List.token(),
            Request::Get { .. } => Verb::Get.token(),
            Request::Raw { token } => token,
        }
    }
}

/// The result of a request that the server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    Listing(String),
    File(Bytes),
    /// The server replied with error text instead of `DATA`.
    Refused(String),
}

/// Performs one request against the server.
pub async fn execute(config: &ClientConfig, request: &Request) -> Result<Transfer, FtServeError> {
    let mut control = TcpStream::connect((config.host.as_str(), config.control_port)).await?;
    let _ = control.set_nodelay(true);

    send_request(&mut control, config.data_port, request).await?;

    let reply = read_control_reply(&mut control);
    tokio::pin!(reply);

    let data = tokio::select! {
        biased;
        early = &mut reply => {
            return match early? {
                Response::Error(message) => Ok(Transfer::Refused(message)),
                other => Err(FtServeError::Protocol(format!(
                    "unexpected {other:?} before the data connection was opened"
                ))),
            };
        }
        data = connect_data(config) => data?,
    };

    match reply.await? {
        Response::Ready => {
            let mut frames = FramedRead::new(data, FrameCodec::new(config.max_message_size));
            let payload = frames.next().await.ok_or(FtServeError::ConnectionClosed)??;
            debug!("Received {} payload bytes", payload.len());
            Ok(match request {
                Request::Get { .. } => Transfer::File(payload),
                _ => Transfer::Listing(String::from_utf8_lossy(&payload).into_owned()),
            })
        }
        Response::Error(message) => Ok(Transfer::Refused(message)),
        Response::Payload(_) => Err(FtServeError::Protocol(
            "payload received on the control connection".into(),
        )),
    }
}

async fn send_request(
    control: &mut TcpStream,
    data_port: u16,
    request: &Request,
) -> Result<(), FtServeError> {
    transport::send_frame(control, request.token().as_bytes()).await?;
    transport::send_length(control, u32::from(data_port)).await?;
    if let Request::Get { filename } = request {
        transport::send_frame(control, filename.as_bytes()).await?;
    }
    Ok(())
}

async fn read_control_reply(control: &mut TcpStream) -> Result<Response, FtServeError> {
    let reply = transport::receive_frame(control, MAX_CONTROL_REPLY_LEN).await?;
    Ok(Response::decode_control(&reply))
}

async fn connect_data(config: &ClientConfig) -> Result<TcpStream, FtServeError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match TcpStream::connect((config.host.as_str(), config.data_port)).await {
            Ok(stream) => return Ok(stream),
            Err(e) if attempt < config.connect_attempts => {
                debug!("Data connection attempt {} failed: {}", attempt, e);
                tokio::time::sleep(config.retry_delay).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Picks where a received file is written inside `dir`: the requested name, or
/// `<stem>_copy<ext>` (repeated as needed) when that name is already taken.
pub fn destination_for(dir: &Path, filename: &str) -> PathBuf {
    let requested = Path::new(filename);
    let name = requested
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());

    let mut candidate = dir.join(&name);
    let stem_path = PathBuf::from(&name);
    let mut stem = stem_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = stem_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    while candidate.exists() {
        stem.push_str("_copy");
        candidate = dir.join(format!("{stem}{extension}"));
    }
    candidate
}
