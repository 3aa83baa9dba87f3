use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Reserved literal marking the end of a server response. Never sent as
/// content; a payload equal to it would break the framing, which is a known
/// limitation of the protocol.
pub const SENTINEL: &str = "Kabuum";

/// First line of every response frame.
pub const RESPONSE_PREAMBLE: &str = "Server response";

/// Address both roles use when no flag is given.
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// Reads one newline-terminated line, with the terminator stripped.
/// Returns `None` when the peer has closed the stream.
pub async fn read_line<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let bytes = reader.read_line(&mut line).await?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(LINE_ENDINGS).to_string()))
}

/// Writes a line with a newline delimiter and flushes so the peer's
/// blocking line reader unblocks immediately.
pub async fn write_line<W>(writer: &mut W, line: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Writes one complete response frame: preamble, tab-prefixed echo, sentinel.
pub async fn write_response_frame<W>(writer: &mut W, echoed: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(RESPONSE_PREAMBLE.as_bytes()).await?;
    writer.write_all(b"\n\t").await?;
    writer.write_all(echoed.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.write_all(SENTINEL.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
