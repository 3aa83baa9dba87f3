use std::{net::SocketAddr, time::Duration};

use anyhow::Result;
use line_chat::{
    protocol::{read_line, write_line, RESPONSE_PREAMBLE, SENTINEL},
    server::Server,
};
use tokio::{
    io::{AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener, TcpStream,
    },
    sync::oneshot,
    task::JoinHandle,
    time::timeout,
};

const READ_TIMEOUT: Duration = Duration::from_secs(1);

#[tokio::test]
async fn each_line_is_echoed_inside_a_frame() -> Result<()> {
    let (addr, shutdown_tx, server) = start_server().await?;

    let (mut reader, mut writer) = connect_with_name(addr, "Ahmet").await?;

    write_line(&mut writer, "Hello").await?;
    expect_frame(&mut reader, "Hello").await?;

    writer.shutdown().await?;
    drop(reader);

    let _ = shutdown_tx.send(());
    let _ = server.await;
    Ok(())
}

#[tokio::test]
async fn sequential_requests_get_independent_frames() -> Result<()> {
    let (addr, shutdown_tx, server) = start_server().await?;

    let (mut reader, mut writer) = connect_with_name(addr, "Ahmet").await?;

    for request in ["A", "B", "C"] {
        write_line(&mut writer, request).await?;
        expect_frame(&mut reader, request).await?;
    }

    writer.shutdown().await?;
    drop(reader);

    let _ = shutdown_tx.send(());
    let _ = server.await;
    Ok(())
}

#[tokio::test]
async fn server_accepts_next_connection_after_disconnect() -> Result<()> {
    let (addr, shutdown_tx, server) = start_server().await?;

    // First peer drops mid-session without ever sending a request.
    let (reader, mut writer) = connect_with_name(addr, "first").await?;
    writer.shutdown().await?;
    drop(reader);
    drop(writer);

    // Second peer gets a full echo cycle from the same listener.
    let (mut reader, mut writer) = connect_with_name(addr, "second").await?;
    write_line(&mut writer, "still alive").await?;
    expect_frame(&mut reader, "still alive").await?;

    writer.shutdown().await?;
    drop(reader);

    let _ = shutdown_tx.send(());
    let _ = server.await;
    Ok(())
}

async fn start_server() -> Result<(SocketAddr, oneshot::Sender<()>, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let server = Server::new(listener);
    let addr = server.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let shutdown = async move {
            let _ = shutdown_rx.await;
        };
        let _ = server.run_until(shutdown).await;
    });

    Ok((addr, shutdown_tx, handle))
}

async fn connect_with_name(
    addr: SocketAddr,
    name: &str,
) -> Result<(BufReader<OwnedReadHalf>, OwnedWriteHalf)> {
    let stream = TcpStream::connect(addr).await?;
    let (reader, mut writer) = stream.into_split();
    let reader = BufReader::new(reader);

    write_line(&mut writer, name).await?;
    Ok((reader, writer))
}

async fn expect_frame(reader: &mut BufReader<OwnedReadHalf>, echoed: &str) -> Result<()> {
    let preamble = read_frame_line(reader).await?;
    assert_eq!(preamble, RESPONSE_PREAMBLE);

    let echo = read_frame_line(reader).await?;
    assert_eq!(echo, format!("\t{echoed}"));

    let sentinel = read_frame_line(reader).await?;
    assert_eq!(sentinel, SENTINEL);
    Ok(())
}

async fn read_frame_line(reader: &mut BufReader<OwnedReadHalf>) -> Result<String> {
    let line = timeout(READ_TIMEOUT, read_line(reader))
        .await??
        .expect("server closed the stream mid-frame");
    Ok(line)
}
