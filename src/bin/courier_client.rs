use std::{error::Error, net::SocketAddr, time::Duration};

use clap::Parser;
use courier::{RpcClient, RpcRequest, RpcResponse};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server address
    address: SocketAddr,
    /// Interface to invoke
    #[arg(long, default_value = "interface")]
    interface: String,
    /// Method to invoke
    #[arg(long, default_value = "method")]
    method: String,
    /// Number of independent exchanges to perform
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Connect timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    connect_timeout_ms: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let client = RpcClient::new(cli.address)
        .with_connect_timeout(Duration::from_millis(cli.connect_timeout_ms));

    let request = RpcRequest {
        interface_name: cli.interface,
        method_name: cli.method,
    };

    for i in 0..cli.count {
        let response: RpcResponse = client.invoke(&request)?;
        println!("[{i}] {}", response.message);
    }

    Ok(())
}
