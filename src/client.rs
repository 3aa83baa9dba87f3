use anyhow::{bail, Context, Result};
use tokio::{
    io::{self, AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tracing::{info, warn};

use crate::{
    cli::ClientArgs,
    protocol::{read_line, write_line, SENTINEL},
};

pub async fn run(args: ClientArgs) -> Result<()> {
    let (mut reader, mut writer) = establish_connection(&args).await?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let name = resolve_name(&args, &mut stdin).await?;
    let Some(name) = name else {
        // Stdin closed before a name was typed; nothing to do.
        return Ok(());
    };
    write_line(&mut writer, &name).await?;

    run_request_loop(&mut reader, &mut writer, &mut stdin).await?;
    shutdown_connection(&mut writer).await;

    Ok(())
}

async fn establish_connection(
    args: &ClientArgs,
) -> Result<(
    BufReader<tokio::net::tcp::OwnedReadHalf>,
    tokio::net::tcp::OwnedWriteHalf,
)> {
    let stream = TcpStream::connect(args.server)
        .await
        .with_context(|| format!("cannot connect to server at {}", args.server))?;

    info!("connected to {}", args.server);

    let (reader, writer) = stream.into_split();
    Ok((BufReader::new(reader), writer))
}

/// Uses the `--name` flag when given, otherwise prompts for one line.
async fn resolve_name<R>(args: &ClientArgs, stdin: &mut R) -> Result<Option<String>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    if let Some(name) = &args.name {
        return Ok(Some(name.clone()));
    }
    write_prompt("Enter your name: ").await?;
    Ok(read_line(stdin).await?)
}

async fn run_request_loop<R, W, S>(reader: &mut R, writer: &mut W, stdin: &mut S) -> Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
    S: tokio::io::AsyncBufRead + Unpin,
{
    loop {
        write_prompt("> ").await?;
        let Some(request) = read_line(stdin).await? else {
            // Stdin EOF is the clean way out of the session.
            break;
        };

        write_line(writer, &request).await?;

        let response = read_response(reader).await?;
        for line in &response {
            write_stdout(line).await?;
        }
    }
    Ok(())
}

/// Reads response lines until the sentinel matches exactly. The sentinel is
/// a control marker, not content, so it is consumed and never returned.
async fn read_response<R>(reader: &mut R) -> Result<Vec<String>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();
    loop {
        match read_line(reader).await? {
            Some(line) if line == SENTINEL => return Ok(lines),
            Some(line) => lines.push(line),
            None => bail!("server closed the connection mid-response"),
        }
    }
}

async fn shutdown_connection(writer: &mut tokio::net::tcp::OwnedWriteHalf) {
    if let Err(error) = writer.shutdown().await {
        warn!(?error, "failed to shutdown client writer cleanly");
    }
}

async fn write_stdout(line: &str) -> io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

// Prompts go to stderr so piped stdout carries only response content.
async fn write_prompt(text: &str) -> io::Result<()> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(text.as_bytes()).await?;
    stderr.flush().await
}
