//! Reference control messages exchanged by the bundled binaries.
//!
//! The transport itself is payload-agnostic; any `Encode + Decode` pair can
//! travel through it.

use bincode::{Decode, Encode};

/// A remote invocation: which interface and method the caller wants.
#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq)]
pub struct RpcRequest {
    pub interface_name: String,
    pub method_name: String,
}

/// The server's answer to one [`RpcRequest`].
#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq)]
pub struct RpcResponse {
    pub message: String,
}
