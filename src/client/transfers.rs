//! Data-channel negotiation and transfer verbs (`ls`, `get`)
//!
//! Four incompatible setup flavours hide behind one entry point:
//!
//! - active (PORT/EPRT): listen locally, announce the endpoint, *then* send
//!   the data verb, then accept the server's connection;
//! - passive (PASV/EPSV): ask the server for an endpoint, connect to it,
//!   *then* send the data verb.
//!
//! In both flavours the transfer only counts once the data channel reaches
//! EOF *and* a final 226/225 arrives on the control channel.

use crate::commands;
use crate::error::{FtpError, Result};
use crate::netaddr;
use crate::reply::codes;
use crate::wire;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::FtpClient;

/// How long to wait for the server to connect back in active mode
const DATA_ACCEPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Receive buffer size for data connections
const DATA_RECV_BUFFER_SIZE: usize = 256 * 1024;

/// Widen the receive buffer on a data socket; failure only costs throughput
fn tune_data_socket(stream: &TcpStream) {
    let sock = socket2::SockRef::from(stream);
    if let Err(e) = sock.set_recv_buffer_size(DATA_RECV_BUFFER_SIZE) {
        warn!("could not widen data-socket receive buffer: {}", e);
    }
}

impl FtpClient {
    /// Fetch a directory listing (`ls [path]`)
    pub async fn list(&mut self, path: Option<&str>) -> Result<Vec<u8>> {
        self.transfer(&commands::list(path)).await
    }

    /// Fetch a remote file into memory (`RETR`)
    pub async fn retr(&mut self, remote: &str) -> Result<Vec<u8>> {
        self.transfer(&commands::retr(remote)).await
    }

    /// Fetch a remote file and store it locally (`get SRC [DST]`)
    ///
    /// Returns the number of bytes written to `local`.
    pub async fn retr_to_file(&mut self, remote: &str, local: &Path) -> Result<u64> {
        let payload = self.retr(remote).await?;

        let mut file = tokio::fs::File::create(local)
            .await
            .map_err(FtpError::FileOpen)?;
        file.write_all(&payload)
            .await
            .map_err(FtpError::FileWrite)?;
        file.flush().await.map_err(FtpError::FileWrite)?;
        Ok(payload.len() as u64)
    }

    /// Run one data-transferring verb through a fresh data channel
    async fn transfer(&mut self, verb_line: &str) -> Result<Vec<u8>> {
        let mut data = if self.passive {
            self.open_passive(verb_line).await?
        } else {
            self.open_active(verb_line).await?
        };
        tune_data_socket(&data);

        let payload = wire::read_until_eof(&mut data).await?;
        drop(data);
        debug!("data channel closed after {} bytes", payload.len());

        // The operation has not completed until the server confirms it
        let reply = self.read_checked_reply().await?;
        if reply.matches_any(&[
            codes::CLOSING_DATA_CONNECTION,
            codes::CONNECTION_OPEN_NO_TRANSFER,
        ]) {
            Ok(payload)
        } else {
            Err(reply.into_error())
        }
    }

    /// Active setup: listen, announce with PORT or EPRT, send the verb,
    /// accept the server's connection
    async fn open_active(&mut self, verb_line: &str) -> Result<TcpStream> {
        let Some(bind_ip) = self.active_bind_addr() else {
            return Err(FtpError::Bind(std::io::Error::other(
                "no local address available for active mode",
            )));
        };

        let listener = TcpListener::bind((bind_ip, 0))
            .await
            .map_err(FtpError::Bind)?;
        let port = listener.local_addr().map_err(FtpError::Listen)?.port();
        debug!("listening for data connection on {}:{}", bind_ip, port);

        let announce = match bind_ip {
            IpAddr::V4(v4) if !self.extended => {
                commands::port(&netaddr::encode_host_port(v4, port))
            }
            _ => commands::eprt(&netaddr::encode_eprt(&bind_ip, port)),
        };
        self.control.send_command(&announce).await?;
        let reply = self.read_checked_reply().await?;
        if !reply.matches(codes::COMMAND_OKAY) {
            return Err(reply.into_error());
        }

        // The data verb goes out only once the listener exists
        self.control.send_command(verb_line).await?;
        let reply = self.read_checked_reply().await?;
        if !reply.matches_any(&[codes::TRANSFER_STARTING, codes::FILE_STATUS_OKAY]) {
            return Err(reply.into_error());
        }

        let (stream, peer) = timeout(DATA_ACCEPT_TIMEOUT, listener.accept())
            .await
            .map_err(|_| FtpError::Accept(std::io::Error::from(std::io::ErrorKind::TimedOut)))?
            .map_err(FtpError::Accept)?;
        debug!("accepted data connection from {}", peer);
        Ok(stream)
    }

    /// Passive setup: learn the server's endpoint, connect, send the verb
    async fn open_passive(&mut self, verb_line: &str) -> Result<TcpStream> {
        let endpoint = if self.extended {
            self.control.send_command(&commands::epsv()).await?;
            let reply = self.read_checked_reply().await?;
            if !reply.matches(codes::ENTERING_EXTENDED_PASSIVE_MODE) {
                return Err(reply.into_error());
            }
            let port = netaddr::parse_epsv_reply(&reply.text)?;
            // EPSV names no address: the data endpoint is the control peer
            (self.control.peer_addr()?.ip(), port)
        } else {
            self.control.send_command(&commands::pasv()).await?;
            let reply = self.read_checked_reply().await?;
            if !reply.matches(codes::ENTERING_PASSIVE_MODE) {
                return Err(reply.into_error());
            }
            let (addr, port) = netaddr::parse_pasv_reply(&reply.text)?;
            (IpAddr::V4(addr), port)
        };

        debug!("connecting data channel to {}:{}", endpoint.0, endpoint.1);
        let stream = TcpStream::connect(endpoint)
            .await
            .map_err(FtpError::Connection)?;

        // The data verb goes out only once the connection is up
        self.control.send_command(verb_line).await?;
        let reply = self.read_checked_reply().await?;
        if !reply.matches_any(&[codes::TRANSFER_STARTING, codes::FILE_STATUS_OKAY]) {
            return Err(reply.into_error());
        }
        Ok(stream)
    }
}
