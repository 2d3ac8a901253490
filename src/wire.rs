//! Control- and data-channel wire codec
//!
//! One [`ControlChannel`] wraps each control connection, on either side of
//! the protocol:
//! - reply reading with multi-line coalescing (client side)
//! - command-line reading (server side)
//! - command and reply writing, with CRLF framing
//! - transfer-log capture of every line that crosses the wire
//!
//! Data-channel payloads never flow through a `ControlChannel`; they use the
//! free function [`read_until_eof`] on the raw data socket.

use crate::error::{FtpError, Result};
use crate::reply::{self, Reply};
use crate::xferlog::XferLog;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Block size for data-channel reads
const DATA_BLOCK_SIZE: usize = 8192;

/// One side of a control connection
#[derive(Debug)]
pub struct ControlChannel {
    stream: BufReader<TcpStream>,
    log: Option<Arc<XferLog>>,
}

impl ControlChannel {
    /// Wrap a connected control socket
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream: BufReader::new(stream),
            log: None,
        }
    }

    /// Wrap a connected control socket, recording traffic in `log`
    pub fn with_log(stream: TcpStream, log: Arc<XferLog>) -> Self {
        Self {
            stream: BufReader::new(stream),
            log: Some(log),
        }
    }

    /// Address of the peer on the other end of the control connection
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.stream.get_ref().peer_addr().map_err(FtpError::SocketRead)
    }

    /// Local address of the control connection
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.stream.get_ref().local_addr().map_err(FtpError::SocketRead)
    }

    async fn read_line(&mut self) -> Result<String> {
        let mut bytes = Vec::with_capacity(512);
        self.stream
            .read_until(b'\n', &mut bytes)
            .await
            .map_err(FtpError::SocketRead)?;
        if bytes.is_empty() {
            return Err(FtpError::SocketEof);
        }

        let line = String::from_utf8_lossy(&bytes);
        let line = line.trim_end_matches(['\r', '\n']).to_string();
        trace!("received: {}", line);
        if let Some(log) = &self.log {
            log.received(&line)?;
        }
        Ok(line)
    }

    /// Read one complete reply, coalescing multi-line replies
    ///
    /// A reply whose first line separates code and text with `-` continues
    /// until a line begins with the same three digits followed by `SP`; that
    /// terminator line is part of the reply. A continuation line that merely
    /// starts with the same digits, without the space, does not end the
    /// reply.
    pub async fn read_reply(&mut self) -> Result<Reply> {
        let first = self.read_line().await?;
        let (code, text) = reply::parse_reply_line(&first)?;
        let mut text = text.to_string();

        if first.as_bytes().get(3) == Some(&b'-') {
            let prefix = &first[0..3];
            loop {
                let line = self.read_line().await?;
                text.push('\n');
                text.push_str(&line);
                if line.len() >= 4 && line.starts_with(prefix) && line.as_bytes()[3] == b' ' {
                    break;
                }
            }
        }

        Ok(Reply { code, text })
    }

    /// Read one reply, failing with [`FtpError::Timeout`] if none arrives
    pub async fn read_reply_timeout(&mut self, limit: Duration) -> Result<Reply> {
        timeout(limit, self.read_reply())
            .await
            .map_err(|_| FtpError::Timeout)?
    }

    /// Read one CRLF-terminated command line, endings stripped
    pub async fn read_command(&mut self) -> Result<String> {
        self.read_line().await
    }

    /// Read one command line, failing with [`FtpError::Timeout`] on idle peers
    pub async fn read_command_timeout(&mut self, limit: Duration) -> Result<String> {
        timeout(limit, self.read_command())
            .await
            .map_err(|_| FtpError::Timeout)?
    }

    /// Write one already-framed command line (`VERB [SP args] CRLF`)
    ///
    /// The write is all-or-nothing: a short or failed write surfaces as
    /// [`FtpError::SocketWrite`] with no retry.
    pub async fn send_command(&mut self, line: &str) -> Result<()> {
        trace!("sending: {}", line.trim_end());
        let stream = self.stream.get_mut();
        stream
            .write_all(line.as_bytes())
            .await
            .map_err(|_| FtpError::SocketWrite)?;
        stream.flush().await.map_err(|_| FtpError::SocketWrite)?;
        if let Some(log) = &self.log {
            log.sent(line.trim_end())?;
        }
        Ok(())
    }

    /// Frame and write one reply
    ///
    /// Single-line text goes out as `code SP text CRLF`; text with interior
    /// newlines goes out as a `code-` block with the `code SP CRLF`
    /// terminator appended.
    pub async fn send_reply(&mut self, code: u16, text: &str) -> Result<()> {
        let rendered = reply::render(code, text);
        trace!("sending reply: {} {}", code, text.lines().next().unwrap_or(""));
        let stream = self.stream.get_mut();
        stream
            .write_all(rendered.as_bytes())
            .await
            .map_err(|_| FtpError::SocketWrite)?;
        stream.flush().await.map_err(|_| FtpError::SocketWrite)?;
        if let Some(log) = &self.log {
            for line in rendered.lines() {
                log.sent(line)?;
            }
        }
        Ok(())
    }
}

/// Read a data connection to exhaustion
///
/// Reads in blocks until the peer closes its end. Zero bytes before close is
/// a valid, empty payload.
pub async fn read_until_eof(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    let mut block = [0u8; DATA_BLOCK_SIZE];
    loop {
        let n = stream.read(&mut block).await.map_err(FtpError::SocketRead)?;
        if n == 0 {
            break;
        }
        payload.extend_from_slice(&block[..n]);
    }
    Ok(payload)
}

/// Write a whole data payload and shut the stream down
///
/// Shutdown delivers the EOF the peer's [`read_until_eof`] is waiting for.
pub async fn write_all_and_close(stream: &mut TcpStream, payload: &[u8]) -> Result<()> {
    stream
        .write_all(payload)
        .await
        .map_err(|_| FtpError::SocketWrite)?;
    stream.shutdown().await.map_err(|_| FtpError::SocketWrite)?;
    Ok(())
}
