pub mod client;
pub mod frame;
pub mod message;
pub mod serialize;
pub mod server;
pub mod transport;

mod thread;

pub use client::RpcClient;
pub use frame::FrameCodec;
pub use message::{RpcRequest, RpcResponse};
pub use serialize::{BincodeSerializer, Serializer};
pub use server::{Handler, RpcServer};
pub use transport::{Connection, RpcError};
