// src/core/protocol/frame.rs

//! A `tokio_util::codec` implementation of the length-prefixed message format,
//! for callers that prefer a `Framed` stream over the raw transport calls.

use super::transport::LENGTH_HEADER_SIZE;
use crate::core::FtServeError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Encodes and decodes `Bytes` messages preceded by a native-endian `u32` count.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn check_size(&self, size: usize) -> Result<(), FtServeError> {
        let max = self.max_frame_size.min(u32::MAX as usize);
        if size > max {
            return Err(FtServeError::MessageTooLarge { size, max });
        }
        Ok(())
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = FtServeError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.check_size(item.len())?;
        dst.reserve(LENGTH_HEADER_SIZE + item.len());
        dst.put_slice(&(item.len() as u32).to_ne_bytes());
        dst.extend_from_slice(&item);
        Ok(())
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = FtServeError;

    /// Returns `Ok(None)` until a whole frame is buffered. The declared length is
    /// validated as soon as the header arrives, before any space is reserved.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LENGTH_HEADER_SIZE {
            return Ok(None);
        }

        let mut header = [0u8; LENGTH_HEADER_SIZE];
        header.copy_from_slice(&src[..LENGTH_HEADER_SIZE]);
        let len = u32::from_ne_bytes(header) as usize;
        self.check_size(len)?;

        let total = LENGTH_HEADER_SIZE + len;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_HEADER_SIZE);
        Ok(Some(src.split_to(len).freeze()))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            None if buf.is_empty() => Ok(None),
            None => Err(FtServeError::IncompleteData),
        }
    }
}
