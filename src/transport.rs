//! Connection endpoint: one stream, one exchange.
//!
//! A [`Connection`] owns a bidirectional byte stream and the frame codec that
//! delimits messages on it. It is deliberately generic over `Read + Write` so
//! the exchange logic can be exercised against in-memory streams, with TCP
//! sockets supplied by the client and server drivers. A connection lives for
//! exactly one request/response round trip; dropping it closes the socket.

use std::io::{self, ErrorKind, Read, Write};

use thiserror::Error;

use crate::frame::{FrameCodec, FrameError};
use crate::serialize::{SerializeError, Serializer};

/// Errors terminating a single call or connection. None are retried
/// internally; a caller wanting resilience must layer retry above `invoke`.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("failed to connect to server: {0}")]
    Connect(#[source] io::Error),
    #[error("failed to send message: {0}")]
    Send(#[source] io::Error),
    #[error(transparent)]
    Framing(#[from] FrameError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error("connection closed before a complete message arrived")]
    IncompleteResponse,
    #[error("transport io error: {0}")]
    Io(#[from] io::Error),
}

const READ_CHUNK: usize = 4096;

pub struct Connection<T: Read + Write> {
    stream: T,
    codec: FrameCodec,
}

impl<T: Read + Write> Connection<T> {
    pub fn new(stream: T) -> Self {
        Self {
            stream,
            codec: FrameCodec::new(),
        }
    }

    /// Encode, frame, and write one message. Write failures surface
    /// immediately as [`RpcError::Send`].
    pub fn send<M, S>(&mut self, serializer: &mut S, message: &M) -> Result<(), RpcError>
    where
        S: Serializer<M>,
    {
        let payload = serializer.encode(message)?;
        let frame = FrameCodec::encode(&payload)?;
        self.stream.write_all(&frame).map_err(RpcError::Send)?;
        self.stream.flush().map_err(RpcError::Send)?;
        Ok(())
    }

    /// Block until one complete message is decoded from the stream.
    ///
    /// End-of-stream or a read error before a full frame has arrived is
    /// [`RpcError::IncompleteResponse`]; an untrustworthy length prefix is
    /// [`RpcError::Framing`]. Either way the connection is no longer usable.
    pub fn receive<M, S>(&mut self, serializer: &mut S) -> Result<M, RpcError>
    where
        S: Serializer<M>,
    {
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if let Some(payload) = self.codec.try_decode()? {
                return Ok(serializer.decode(&payload)?);
            }

            let read = match self.stream.read(&mut chunk) {
                Ok(0) => return Err(RpcError::IncompleteResponse),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => return Err(RpcError::IncompleteResponse),
            };
            self.codec.feed(&chunk[..read]);
        }
    }
}
