//! Connection management for the FTP client
//!
//! Handles TCP connection establishment, socket tuning, local address
//! discovery, and the server greeting exchange.

use crate::error::{FtpError, Result};
use crate::netaddr;
use crate::reply::codes;
use crate::wire::ControlChannel;
use crate::xferlog::XferLog;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use super::FtpClient;

impl FtpClient {
    /// Connect to an FTP server and consume the greeting
    ///
    /// Discovers the host's local addresses once, derives the initial mode
    /// flags from them, then waits for the server's `220`. A `120`
    /// (service ready in N minutes) greeting is read past until the real
    /// `220` arrives; anything else fails with [`FtpError::Accepting`].
    ///
    /// # Errors
    ///
    /// - [`FtpError::Host`] - the host name did not resolve
    /// - [`FtpError::Connection`] - the TCP connection failed
    /// - [`FtpError::Accepting`] - the server did not greet with `220`
    pub async fn connect(host: &str, port: u16, log: Option<Arc<XferLog>>) -> Result<Self> {
        debug!("connecting to FTP server {}:{}", host, port);

        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|_| FtpError::Host)?
            .next()
            .ok_or(FtpError::Host)?;

        let stream = TcpStream::connect(addr)
            .await
            .map_err(FtpError::Connection)?;

        // Low-latency request/response pattern on the control channel
        let sock = socket2::SockRef::from(&stream);
        if let Err(e) = sock.set_nodelay(true) {
            warn!("could not set TCP_NODELAY on control connection: {}", e);
        }

        let (local_ip4, local_ip6) = netaddr::discover_local_addrs();
        debug!(?local_ip4, ?local_ip6, "discovered local addresses");

        let control = match log {
            Some(log) => ControlChannel::with_log(stream, log),
            None => ControlChannel::new(stream),
        };

        let mut client = Self {
            control,
            local_ip4,
            local_ip6,
            // With no local address to advertise, only passive mode works
            passive: local_ip4.is_none() && local_ip6.is_none(),
            // Active mode without IPv4 can only be EPRT
            extended: local_ip4.is_none(),
            echo: false,
        };

        let mut greeting = client.read_checked_reply().await?;
        while greeting.matches(codes::SERVICE_READY_IN) {
            greeting = client.read_checked_reply().await?;
        }
        if !greeting.matches(codes::SERVICE_READY) {
            return Err(FtpError::Accepting);
        }
        debug!("server greeting: {} {}", greeting.code, greeting.text);

        Ok(client)
    }
}
