use std::{future::Future, io, net::SocketAddr};

use anyhow::Result;
use tokio::{
    io::BufReader,
    net::{TcpListener, TcpStream},
    select,
};
use tracing::{info, warn};

use crate::protocol::{read_line, write_response_frame};

pub struct Server {
    listener: TcpListener,
}

impl Server {
    pub fn new(listener: TcpListener) -> Self {
        Self { listener }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts and serves connections one at a time until `shutdown`
    /// completes. A session runs to completion before the next accept, so
    /// there is never more than one active peer.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let Server { listener } = self;
        tokio::pin!(shutdown);

        loop {
            select! {
                _ = &mut shutdown => {
                    info!("server shutting down");
                    break;
                }
                accept_result = listener.accept() => {
                    handle_accept_result(accept_result).await;
                }
            }
        }

        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

fn log_session_end(peer: SocketAddr, result: io::Result<SessionEnd>) {
    // A failed session never takes the listener down; log and move on to
    // the next accept.
    match result {
        Ok(SessionEnd::Disconnected { name }) => {
            info!(peer = %peer, name, "peer disconnected");
        }
        Ok(SessionEnd::NoName) => {
            info!(peer = %peer, "peer closed before sending a name");
        }
        Err(err) => warn!(peer = %peer, error = ?err, "session ended with error"),
    }
}

async fn handle_accept_result(result: io::Result<(TcpStream, SocketAddr)>) {
    match result {
        Ok((stream, peer)) => {
            let (reader, mut writer) = stream.into_split();
            let mut reader = BufReader::new(reader);
            let outcome = run_session(&mut reader, &mut writer, peer).await;
            log_session_end(peer, outcome);
        }
        Err(err) => warn!(error = ?err, "failed to accept connection"),
    }
}

#[derive(Debug)]
enum SessionEnd {
    /// Peer sent a name and later closed the stream cleanly.
    Disconnected { name: String },
    /// Peer closed before the name line arrived.
    NoName,
}

async fn run_session<R, W>(reader: &mut R, writer: &mut W, peer: SocketAddr) -> io::Result<SessionEnd>
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    let name = match read_line(reader).await? {
        Some(name) => name,
        None => return Ok(SessionEnd::NoName),
    };
    info!(peer = %peer, name, "session started");

    loop {
        match read_line(reader).await? {
            Some(line) => write_response_frame(writer, &line).await?,
            None => return Ok(SessionEnd::Disconnected { name }),
        }
    }
}
