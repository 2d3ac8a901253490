//! Server side of data-connection establishment
//!
//! The mirror image of the client's negotiation: for PASV the server
//! listens on an ephemeral port and the client connects in; for PORT/EPRT
//! the server connects out to the endpoint the client announced.

use crate::error::{FtpError, Result};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::debug;

/// How long a PASV listener waits for the client to connect in
pub(super) const PASV_ACCEPT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a PORT/EPRT connect-back may take
const CONNECT_BACK_TIMEOUT: Duration = Duration::from_secs(30);

/// Bind an ephemeral listener for a PASV data connection
pub(super) async fn passive_listener(addr: IpAddr) -> Result<(TcpListener, u16)> {
    let listener = TcpListener::bind((addr, 0)).await.map_err(FtpError::Bind)?;
    let port = listener.local_addr().map_err(FtpError::Listen)?.port();
    debug!("passive data listener on {}:{}", addr, port);
    Ok((listener, port))
}

/// Accept the single expected data connection on a PASV listener
pub(super) async fn accept_one(listener: TcpListener) -> Result<TcpStream> {
    let (stream, peer) = timeout(PASV_ACCEPT_TIMEOUT, listener.accept())
        .await
        .map_err(|_| FtpError::Accept(std::io::Error::from(std::io::ErrorKind::TimedOut)))?
        .map_err(FtpError::Accept)?;
    debug!("accepted data connection from {}", peer);
    Ok(stream)
}

/// Connect out to the endpoint a PORT/EPRT command announced
pub(super) async fn connect_back(addr: IpAddr, port: u16) -> Result<TcpStream> {
    let endpoint = SocketAddr::new(addr, port);
    debug!("connecting data channel back to {}", endpoint);
    timeout(CONNECT_BACK_TIMEOUT, TcpStream::connect(endpoint))
        .await
        .map_err(|_| FtpError::Connection(std::io::Error::from(std::io::ErrorKind::TimedOut)))?
        .map_err(FtpError::Connection)
}
