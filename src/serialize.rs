//! Pluggable payload serialization.
//!
//! The framing layer treats payloads as opaque bytes; this module defines the
//! boundary where typed messages become those bytes. The target type is fixed
//! per pipeline direction (the client decodes responses, the server decodes
//! requests) through the trait's type parameter rather than discovered from
//! the payload itself.
//!
//! Serializer instances are cheap and must not be shared between concurrent
//! exchanges: every `invoke` call and every server connection creates its own
//! and drops it afterwards, so scratch state never leaks between logically
//! unrelated messages.

use bincode::config::{BigEndian, Configuration, Fixint};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode message: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Converts typed messages to and from payload bytes.
///
/// Implementations must guarantee `decode(encode(v)) == v` for every
/// encodable `v`, and must reject payloads that are malformed, truncated, or
/// do not describe a `T`.
pub trait Serializer<T> {
    fn encode(&mut self, value: &T) -> Result<Vec<u8>, SerializeError>;
    fn decode(&mut self, bytes: &[u8]) -> Result<T, SerializeError>;
}

/// Reference serializer backed by bincode's big-endian fixed-int encoding.
pub struct BincodeSerializer {
    config: Configuration<BigEndian, Fixint>,
}

impl BincodeSerializer {
    pub fn new() -> Self {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_fixed_int_encoding();
        Self { config }
    }
}

impl Default for BincodeSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Serializer<T> for BincodeSerializer
where
    T: bincode::Encode + bincode::Decode<()>,
{
    fn encode(&mut self, value: &T) -> Result<Vec<u8>, SerializeError> {
        Ok(bincode::encode_to_vec(value, self.config)?)
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<T, SerializeError> {
        let (value, read) = bincode::decode_from_slice(bytes, self.config)?;
        if read != bytes.len() {
            return Err(SerializeError::Decode(
                bincode::error::DecodeError::Other("trailing bytes after message"),
            ));
        }
        Ok(value)
    }
}
