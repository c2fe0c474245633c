//! Wire framing for the RPC byte stream.
//!
//! Every message travels as a single frame:
//!
//! ```text
//! Frame := LengthPrefix(4 bytes, big-endian, unsigned, value = N) || Payload(N bytes)
//! ```
//!
//! The codec operates purely on an in-memory buffer; reading from the socket
//! and backpressure are the transport's concern. Bytes are appended with
//! [`FrameCodec::feed`] as they arrive, and [`FrameCodec::try_decode`] drains
//! complete frames in arrival order. A single socket read may carry zero, one,
//! or several frames; each is emitted independently.
//!
//! An incomplete frame consumes nothing: the read position never advances past
//! a frame whose payload has not fully arrived, so a later `feed` can complete
//! it. A length prefix with its sign bit set is a protocol violation; the
//! decoder refuses to consume anything further since there is no reliable way
//! to find the next frame boundary, and the caller is expected to abandon the
//! connection.

use thiserror::Error;

/// Size of the length prefix preceding every payload.
pub const PREFIX_LEN: usize = 4;

/// Largest payload the 4-byte signed-compatible prefix can describe.
pub const MAX_PAYLOAD_LEN: usize = i32::MAX as usize;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid frame length prefix: {0:#010x}")]
    InvalidLength(u32),
    #[error("payload of {0} bytes does not fit in the length prefix")]
    Oversize(usize),
}

/// Incremental decoder for length-prefixed frames.
pub struct FrameCodec {
    buffer: Vec<u8>,
    max_payload: usize,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::with_max_payload(MAX_PAYLOAD_LEN)
    }

    /// A codec that rejects frames declaring more than `max_payload` bytes.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_payload: max_payload.min(MAX_PAYLOAD_LEN),
        }
    }

    /// Append bytes read from the transport.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of buffered, not yet consumed bytes.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Attempt to decode the next complete frame from the buffered bytes.
    ///
    /// Returns `Ok(None)` when more input is needed; nothing is consumed in
    /// that case. Returns an error when the length prefix is untrustworthy;
    /// the stream must then be abandoned.
    pub fn try_decode(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        if self.buffer.len() < PREFIX_LEN {
            return Ok(None);
        }

        let declared = u32::from_be_bytes([
            self.buffer[0],
            self.buffer[1],
            self.buffer[2],
            self.buffer[3],
        ]);
        if declared > i32::MAX as u32 || declared as usize > self.max_payload {
            return Err(FrameError::InvalidLength(declared));
        }

        let len = declared as usize;
        if self.buffer.len() < PREFIX_LEN + len {
            return Ok(None);
        }

        let payload = self.buffer[PREFIX_LEN..PREFIX_LEN + len].to_vec();
        self.buffer.drain(..PREFIX_LEN + len);
        Ok(Some(payload))
    }

    /// Frame a payload as one contiguous write unit.
    pub fn encode(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::Oversize(payload.len()));
        }

        let mut frame = Vec::with_capacity(PREFIX_LEN + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(payload);
        Ok(frame)
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}
