use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

use crate::protocol::DEFAULT_ADDR;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the echo server, handling one connection at a time.
    Server(ServerArgs),
    /// Connect to the server and exchange lines interactively.
    Client(ClientArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Socket address the server should bind to. Use port 0 for an ephemeral port.
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub listen: SocketAddr,
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Display name sent as the first line. Prompted for interactively when omitted.
    #[arg(long)]
    pub name: Option<String>,

    /// Address of the server to connect to.
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub server: SocketAddr,
}
