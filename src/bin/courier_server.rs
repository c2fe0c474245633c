use std::{error::Error, net::SocketAddr};

use clap::Parser;
use courier::{RpcRequest, RpcResponse, RpcServer};
use log::info;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Listen for new connections at address
    address: SocketAddr,
    /// Worker threads serving connections
    #[arg(long, default_value_t = 15)]
    workers: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let server = RpcServer::new(cli.address, |request: RpcRequest| {
        info!(
            "handling {}::{}",
            request.interface_name, request.method_name
        );
        RpcResponse {
            message: "message from server".to_string(),
        }
    })
    .with_workers(cli.workers);

    server.listen()?;
    Ok(())
}
