// src/core/protocol/transport.rs

//! Length-prefixed send/receive primitives over a reliable byte stream.
//!
//! Every message travels as two framing steps: a 4-byte count, then exactly that
//! many payload bytes. Counts are raw native-endian `u32`s, not text. Each call
//! either moves the whole unit or fails; there are no partial successes.

use crate::core::FtServeError;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// The width of the length header preceding every message.
pub const LENGTH_HEADER_SIZE: usize = 4;

/// Reads are staged through a fixed scratch buffer of this size.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Writes the length header for a message of `n` bytes.
pub async fn send_length<W>(conn: &mut W, n: u32) -> Result<(), FtServeError>
where
    W: AsyncWrite + Unpin,
{
    write_fully(conn, &n.to_ne_bytes()).await?;
    conn.flush().await?;
    Ok(())
}

/// Reads one length header.
pub async fn receive_length<R>(conn: &mut R) -> Result<u32, FtServeError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; LENGTH_HEADER_SIZE];
    read_fully(conn, &mut header).await?;
    Ok(u32::from_ne_bytes(header))
}

/// Writes `bytes` to the connection, looping until every byte is out.
pub async fn send_message<W>(conn: &mut W, bytes: &[u8]) -> Result<(), FtServeError>
where
    W: AsyncWrite + Unpin,
{
    write_fully(conn, bytes).await?;
    conn.flush().await?;
    Ok(())
}

/// Reads exactly `expected_len` bytes from the connection.
///
/// The length is checked against `max_len` before anything is allocated, so a
/// peer cannot make the reader reserve more than the configured maximum.
pub async fn receive_message<R>(
    conn: &mut R,
    expected_len: usize,
    max_len: usize,
) -> Result<Bytes, FtServeError>
where
    R: AsyncRead + Unpin,
{
    if expected_len > max_len {
        return Err(FtServeError::MessageTooLarge {
            size: expected_len,
            max: max_len,
        });
    }

    let mut message = BytesMut::with_capacity(expected_len);
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    while message.len() < expected_len {
        let want = (expected_len - message.len()).min(READ_CHUNK_SIZE);
        match conn.read(&mut chunk[..want]).await? {
            0 => return Err(FtServeError::ConnectionClosed),
            n => message.extend_from_slice(&chunk[..n]),
        }
    }
    Ok(message.freeze())
}

/// Sends a full (length, message) pair.
pub async fn send_frame<W>(conn: &mut W, bytes: &[u8]) -> Result<(), FtServeError>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(bytes.len()).map_err(|_| FtServeError::MessageTooLarge {
        size: bytes.len(),
        max: u32::MAX as usize,
    })?;
    send_length(conn, len).await?;
    send_message(conn, bytes).await
}

/// Receives a full (length, message) pair.
pub async fn receive_frame<R>(conn: &mut R, max_len: usize) -> Result<Bytes, FtServeError>
where
    R: AsyncRead + Unpin,
{
    let len = receive_length(conn).await? as usize;
    receive_message(conn, len, max_len).await
}

/// Loops `write` until the whole slice is accepted. A write that accepts zero
/// bytes means the stream is gone, so the loop stops instead of spinning.
async fn write_fully<W>(conn: &mut W, bytes: &[u8]) -> Result<(), FtServeError>
where
    W: AsyncWrite + Unpin,
{
    let mut offset = 0;
    while offset < bytes.len() {
        match conn.write(&bytes[offset..]).await? {
            0 => return Err(FtServeError::ConnectionClosed),
            n => offset += n,
        }
    }
    Ok(())
}

/// Fills `buf` completely, failing on a zero-byte read.
async fn read_fully<R>(conn: &mut R, buf: &mut [u8]) -> Result<(), FtServeError>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match conn.read(&mut buf[filled..]).await? {
            0 => return Err(FtServeError::ConnectionClosed),
            n => filled += n,
        }
    }
    Ok(())
}
