// src/connection/handler.rs

//! Defines the `SessionHandler` which drives one client's session from the
//! first command byte to the closing of both connections.

use super::data_channel;
use super::guard::SessionGuard;
use super::session::{SessionOutcome, SessionPhase, SessionState};
use crate::core::directory::{self, Lookup};
use crate::core::protocol::command::{MAX_COMMAND_LEN, MAX_FILENAME_LEN};
use crate::core::protocol::response::{
    self, FILE_NOT_FOUND_MESSAGE, FILE_TOO_LARGE_MESSAGE, FILE_UNREADABLE_MESSAGE,
    INVALID_COMMAND_MESSAGE, NOT_A_FILE_MESSAGE,
};
use crate::core::protocol::transport;
use crate::core::state::ServerState;
use crate::core::{Command, FtServeError, Response, Verb};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Owns a session's control connection and, once negotiated, its data connection.
pub struct SessionHandler {
    control: TcpStream,
    data: Option<TcpStream>,
    state: Arc<ServerState>,
    session: SessionState,
}

impl SessionHandler {
    /// Creates a new `SessionHandler` for an accepted control connection.
    pub fn new(
        control: TcpStream,
        addr: SocketAddr,
        state: Arc<ServerState>,
        session_id: u64,
    ) -> Self {
        Self {
            control,
            data: None,
            state,
            session: SessionState::new(session_id, addr),
        }
    }

    /// Runs the session to completion. Both connections are closed before this
    /// returns, whatever the result.
    pub async fn run(mut self) -> Result<SessionOutcome, FtServeError> {
        let _guard = SessionGuard::new(self.state.clone(), self.session.id, self.session.peer);

        let result = self.drive().await;
        match &result {
            Ok(outcome) => {
                self.state.stats.increment_completed_sessions();
                self.state.stats.add_bytes_sent(outcome.bytes_sent() as u64);
                info!(
                    "Session {} ({}) finished {}: {:?}",
                    self.session.id,
                    self.session.peer,
                    self.session.request_summary(),
                    outcome
                );
            }
            Err(_) => self.state.stats.increment_failed_sessions(),
        }

        self.close().await;
        result
    }

    async fn drive(&mut self) -> Result<SessionOutcome, FtServeError> {
        match self.await_command().await? {
            Verb::Unknown(token) => self.reject(token).await,
            Verb::List => {
                self.await_data_port().await?;
                self.list().await
            }
            Verb::Get => {
                self.await_data_port().await?;
                self.transfer().await
            }
        }
    }

    /// Reads the command token. A token longer than any valid one is not read
    /// at all; it is an unknown command and the closing drain discards it.
    async fn await_command(&mut self) -> Result<Verb, FtServeError> {
        let len = transport::receive_length(&mut self.control).await? as usize;
        let verb = if len > MAX_COMMAND_LEN {
            Verb::Unknown(format!("<{len}-byte token>"))
        } else {
            let token = transport::receive_message(&mut self.control, len, MAX_COMMAND_LEN).await?;
            Verb::decode(&token)
        };
        debug!(
            "Session {}: received command token {:?}",
            self.session.id,
            verb.token()
        );
        self.session.verb = Some(verb.clone());
        Ok(verb)
    }

    /// Reads the negotiated port and accepts the single data connection on it.
    async fn await_data_port(&mut self) -> Result<(), FtServeError> {
        self.session.advance(SessionPhase::AwaitDataPort);

        // The port travels in the same 4-byte encoding as a length header.
        let raw = transport::receive_length(&mut self.control).await?;
        let port = data_channel::validate_port(raw)?;
        self.session.data_port = Some(port);

        info!(
            "Session {}: opening data connection on port {}",
            self.session.id, port
        );
        let (stream, addr) = data_channel::open(&self.state.config.host, port).await?;
        debug!(
            "Session {}: data connection accepted from {}",
            self.session.id, addr
        );
        self.data = Some(stream);
        Ok(())
    }

    async fn list(&mut self) -> Result<SessionOutcome, FtServeError> {
        self.session.advance(SessionPhase::Listing);
        self.session.command = Some(Command::List);

        let entries = directory::list_entries(&self.state.config.root).await?;
        let payload = response::encode_list_response(&entries);
        let bytes = payload.payload_len();
        self.deliver(payload).await?;

        Ok(SessionOutcome::Listed {
            entries: entries.len(),
            bytes,
        })
    }

    async fn transfer(&mut self) -> Result<SessionOutcome, FtServeError> {
        self.session.advance(SessionPhase::Transferring);

        // No entry can have a name this long, so the name itself is left unread.
        let len = transport::receive_length(&mut self.control).await? as usize;
        if len > MAX_FILENAME_LEN {
            let filename = format!("<{len}-byte name>");
            info!(
                "Session {}: requested name is {} bytes, longer than any entry",
                self.session.id, len
            );
            self.session.command = Some(Command::Get {
                filename: filename.clone(),
            });
            self.refuse(FILE_NOT_FOUND_MESSAGE).await?;
            return Ok(SessionOutcome::NotFound { filename });
        }

        let name = transport::receive_message(&mut self.control, len, MAX_FILENAME_LEN).await?;
        let filename = String::from_utf8_lossy(&name).into_owned();
        info!(
            "Session {}: client requested file [{}]",
            self.session.id, filename
        );
        self.session.command = Some(Command::Get {
            filename: filename.clone(),
        });

        let state = self.state.clone();
        let lookup = directory::find_entry(&state.config.root, &filename).await?;
        match lookup {
            Lookup::Missing => {
                info!("Session {}: [{}] does not exist", self.session.id, filename);
                self.refuse(FILE_NOT_FOUND_MESSAGE).await?;
                Ok(SessionOutcome::NotFound { filename })
            }
            Lookup::NotAFile => {
                self.refuse(NOT_A_FILE_MESSAGE).await?;
                Ok(SessionOutcome::Unservable {
                    filename,
                    reason: NOT_A_FILE_MESSAGE.to_string(),
                })
            }
            Lookup::File { path, .. } => {
                match directory::read_file(&path, state.config.max_message_size).await {
                    Ok(contents) => {
                        let bytes = contents.len();
                        self.deliver(response::encode_get_response(contents)).await?;
                        Ok(SessionOutcome::Sent { filename, bytes })
                    }
                    Err(e) => {
                        warn!(
                            "Session {}: cannot serve [{}]: {}",
                            self.session.id, filename, e
                        );
                        let reason = match e {
                            FtServeError::MessageTooLarge { .. } => FILE_TOO_LARGE_MESSAGE,
                            _ => FILE_UNREADABLE_MESSAGE,
                        };
                        self.refuse(reason).await?;
                        Ok(SessionOutcome::Unservable {
                            filename,
                            reason: reason.to_string(),
                        })
                    }
                }
            }
        }
    }

    async fn reject(&mut self, token: String) -> Result<SessionOutcome, FtServeError> {
        self.session.advance(SessionPhase::Rejecting);
        info!(
            "Session {}: rejecting invalid command [{}]",
            self.session.id, token
        );
        self.refuse(INVALID_COMMAND_MESSAGE).await?;
        Ok(SessionOutcome::Rejected { token })
    }

    /// Signals `DATA` on the control connection, then sends the payload on the data connection.
    async fn deliver(&mut self, payload: Response) -> Result<(), FtServeError> {
        let data = self
            .data
            .as_mut()
            .ok_or_else(|| FtServeError::Internal("data connection is not open".into()))?;
        Response::Ready.write_to(&mut self.control).await?;
        payload.write_to(data).await
    }

    /// Sends an error reply on the control connection.
    async fn refuse(&mut self, message: &str) -> Result<(), FtServeError> {
        response::encode_error(message)
            .write_to(&mut self.control)
            .await
    }

    async fn close(&mut self) {
        if let Some(mut data) = self.data.take()
            && let Err(e) = data.shutdown().await
        {
            debug!(
                "Session {}: data connection shutdown error: {}",
                self.session.id, e
            );
        }
        let linger = Duration::from_millis(self.state.config.linger_timeout_ms);
        linger_close(&mut self.control, linger).await;
        self.session.advance(SessionPhase::Closed);
    }
}

/// Half-closes `stream` and discards whatever the peer still sends until it
/// closes its side or `linger` elapses. Closing a socket with unread input
/// makes the kernel reset the connection, which can destroy a reply the peer
/// has not read yet.
async fn linger_close(stream: &mut TcpStream, linger: Duration) {
    if stream.shutdown().await.is_err() {
        return;
    }
    let mut scratch = [0u8; 512];
    let drain = async {
        loop {
            match stream.read(&mut scratch).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
    };
    let _ = tokio::time::timeout(linger, drain).await;
}
