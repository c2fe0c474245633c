//! Client-side exchange driver.
//!
//! [`RpcClient::invoke`] performs one full exchange as a unit: connect, send
//! the request, block until the response frame decodes, close. Every call
//! opens its own connection and gets its own serializer instance; nothing is
//! shared between calls, so concurrent invokes from different threads cannot
//! interfere with each other.

use std::{
    net::{SocketAddr, TcpStream},
    time::Duration,
};

use log::{debug, info};

use crate::serialize::{BincodeSerializer, Serializer};
use crate::transport::{Connection, RpcError};

/// Matches the connect budget of the reference deployment.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RpcClient {
    address: SocketAddr,
    connect_timeout: Duration,
}

impl RpcClient {
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Perform one request/response exchange with the default serializer.
    ///
    /// Any component failure is terminal for this call; there is no internal
    /// retry. The connection is closed when this returns, success or not.
    pub fn invoke<Req, Resp>(&self, request: &Req) -> Result<Resp, RpcError>
    where
        BincodeSerializer: Serializer<Req> + Serializer<Resp>,
    {
        self.invoke_with(&mut BincodeSerializer::new(), request)
    }

    /// Perform one exchange with a caller-supplied serializer. The serializer
    /// is borrowed exclusively for the duration of the call.
    pub fn invoke_with<Req, Resp, S>(
        &self,
        serializer: &mut S,
        request: &Req,
    ) -> Result<Resp, RpcError>
    where
        S: Serializer<Req> + Serializer<Resp>,
    {
        let stream = TcpStream::connect_timeout(&self.address, self.connect_timeout)
            .map_err(RpcError::Connect)?;
        stream.set_nodelay(true).map_err(RpcError::Connect)?;
        info!("connected to {}", self.address);

        let mut conn = Connection::new(stream);
        conn.send(serializer, request)?;
        debug!("request sent, awaiting response");

        // dropping conn closes the socket; the exchange is single-use
        conn.receive(serializer)
    }
}
