//! Server-side exchange driver.
//!
//! An [`RpcServer`] accepts connections and hands each one to a worker
//! thread, which reads exactly one request, invokes the configured handler,
//! writes the response, and closes. A peer that sends garbage or disconnects
//! early is owed nothing: its connection is abandoned without a response,
//! logged at warn level, and no other connection is affected.
//!
//! Connections share only the handler behind an `Arc`; the stream, codec
//! buffer, and serializer of each exchange are exclusively owned by the
//! worker serving it.

use std::{
    marker::PhantomData,
    net::{SocketAddr, TcpListener, TcpStream},
    sync::Arc,
};

use log::{info, warn};

use crate::serialize::{BincodeSerializer, Serializer};
use crate::thread::ThreadPool;
use crate::transport::{Connection, RpcError};

const DEFAULT_WORKERS: usize = 15;

/// Maps one decoded request to the response value to send back.
pub trait Handler<Req, Resp>: Send + Sync {
    fn handle(&self, request: Req) -> Resp;
}

impl<F, Req, Resp> Handler<Req, Resp> for F
where
    F: Fn(Req) -> Resp + Send + Sync,
{
    fn handle(&self, request: Req) -> Resp {
        self(request)
    }
}

pub struct RpcServer<Req, Resp, H> {
    address: SocketAddr,
    handler: Arc<H>,
    workers: usize,
    _exchange: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp, H> RpcServer<Req, Resp, H>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    H: Handler<Req, Resp> + 'static,
    BincodeSerializer: Serializer<Req> + Serializer<Resp>,
{
    pub fn new(address: SocketAddr, handler: H) -> Self {
        Self {
            address,
            handler: Arc::new(handler),
            workers: DEFAULT_WORKERS,
            _exchange: PhantomData,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Bind the configured address and serve until the listener fails.
    pub fn listen(self) -> Result<(), RpcError> {
        let listener = TcpListener::bind(self.address)?;
        self.serve(listener)
    }

    /// Serve connections from an externally supplied listener.
    pub fn serve(self, listener: TcpListener) -> Result<(), RpcError> {
        info!("listening at {}", listener.local_addr()?);
        let pool = ThreadPool::new(self.workers);

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let handler = Arc::clone(&self.handler);
                    pool.execute(move || {
                        if let Err(e) = handle_connection::<Req, Resp, H>(stream, handler) {
                            warn!("connection abandoned: {e}");
                        }
                    });
                }
                Err(e) => warn!("broken connection: {e:?}"),
            }
        }
        Ok(())
    }
}

/// One exchange: read a request, compute, reply, close.
///
/// Every failure path closes the connection without a response; the protocol
/// has no error-response payload.
fn handle_connection<Req, Resp, H>(stream: TcpStream, handler: Arc<H>) -> Result<(), RpcError>
where
    H: Handler<Req, Resp>,
    BincodeSerializer: Serializer<Req> + Serializer<Resp>,
{
    let mut serializer = BincodeSerializer::new();
    let mut conn = Connection::new(stream);

    let request: Req = conn.receive(&mut serializer)?;
    info!("received request");

    let response = handler.handle(request);
    conn.send(&mut serializer, &response)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        thread,
        time::Duration,
    };

    use super::*;
    use crate::client::RpcClient;
    use crate::frame::FrameCodec;
    use crate::message::{RpcRequest, RpcResponse};

    fn spawn_server<H>(handler: H) -> SocketAddr
    where
        H: Handler<RpcRequest, RpcResponse> + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let server = RpcServer::new(address, handler).with_workers(4);
        thread::spawn(move || server.serve(listener));
        address
    }

    fn request(name: &str) -> RpcRequest {
        RpcRequest {
            interface_name: "interface".into(),
            method_name: name.into(),
        }
    }

    #[test]
    fn fixed_response_exchange() {
        let address = spawn_server(|_req: RpcRequest| RpcResponse {
            message: "message from server".into(),
        });
        let client = RpcClient::new(address);

        let first: RpcResponse = client.invoke(&request("foo")).unwrap();
        assert_eq!(first.message, "message from server");

        // a second exchange on a fresh connection succeeds independently
        let second: RpcResponse = client.invoke(&request("bar")).unwrap();
        assert_eq!(second.message, "message from server");
    }

    #[test]
    fn concurrent_invokes_are_isolated() {
        let address = spawn_server(|req: RpcRequest| RpcResponse {
            message: format!("echo:{}", req.method_name),
        });

        let callers: Vec<_> = (0..8)
            .map(|i| {
                thread::spawn(move || {
                    let client = RpcClient::new(address);
                    let resp: RpcResponse = client.invoke(&request(&format!("m{i}"))).unwrap();
                    (i, resp)
                })
            })
            .collect();

        for caller in callers {
            let (i, resp) = caller.join().unwrap();
            assert_eq!(resp.message, format!("echo:m{i}"));
        }
    }

    #[test]
    fn garbage_payload_gets_no_response() {
        let address = spawn_server(|_req: RpcRequest| RpcResponse {
            message: "never sent".into(),
        });

        // a well-formed frame whose payload is not a decodable request
        let mut stream = TcpStream::connect(address).unwrap();
        let frame = FrameCodec::encode(&[0xff; 8]).unwrap();
        stream.write_all(&frame).unwrap();

        // server closes without responding
        let mut buf = Vec::new();
        let read = stream.read_to_end(&mut buf).unwrap();
        assert_eq!(read, 0);
    }

    #[test]
    fn early_disconnect_leaves_server_serving() {
        let address = spawn_server(|_req: RpcRequest| RpcResponse {
            message: "still here".into(),
        });

        // connect and hang up before sending a full frame
        {
            let mut stream = TcpStream::connect(address).unwrap();
            stream.write_all(&[0x00, 0x00]).unwrap();
        }
        thread::sleep(Duration::from_millis(50));

        let client = RpcClient::new(address);
        let resp: RpcResponse = client.invoke(&request("after")).unwrap();
        assert_eq!(resp.message, "still here");
    }

    #[test]
    fn connect_to_unbound_port_fails() {
        // bind then drop to obtain a port nothing is listening on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let address: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();

        let client = RpcClient::new(address).with_connect_timeout(Duration::from_millis(500));
        let result: Result<RpcResponse, _> = client.invoke(&request("void"));
        assert!(matches!(result, Err(RpcError::Connect(_))));
    }
}
