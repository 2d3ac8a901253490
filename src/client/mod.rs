//! FTP client implementation
//!
//! [`FtpClient`] owns one control connection and the session flags that
//! drive data-channel negotiation. The flag invariants from the protocol
//! design hold by construction:
//! - with no local address at all, the session is forced into passive mode;
//! - active mode without an IPv4 address forces extended (EPRT) mode on.

mod auth;
mod connection;
mod navigation;
pub mod repl;
mod transfers;

pub use auth::LoginStep;

use crate::error::{FtpError, Result};
use crate::reply::{Reply, codes};
use crate::wire::ControlChannel;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

/// How long to wait for any single control-channel reply
const REPLY_TIMEOUT: Duration = Duration::from_secs(60);

/// Interactive FTP client session
///
/// # Example
///
/// ```no_run
/// use ftp_rs::FtpClient;
///
/// # async fn example() -> ftp_rs::Result<()> {
/// let mut client = FtpClient::connect("ftp.example.com", 21, None).await?;
/// client.send_user("alice").await?;
/// client.send_pass("secret").await?;
/// let listing = client.list(Some("/tmp")).await?;
/// println!("{}", String::from_utf8_lossy(&listing));
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug)]
pub struct FtpClient {
    /// Control connection codec
    control: ControlChannel,
    /// First non-loopback IPv4 address, discovered once at startup
    local_ip4: Option<Ipv4Addr>,
    /// First non-loopback IPv6 address, discovered once at startup
    local_ip6: Option<Ipv6Addr>,
    /// Use passive (PASV/EPSV) instead of active (PORT/EPRT) negotiation
    passive: bool,
    /// Use the RFC 2428 extended commands (EPRT/EPSV)
    extended: bool,
    /// Echo every reply to stdout as it arrives (interactive use)
    echo: bool,
}

impl FtpClient {
    /// Whether the session currently negotiates data channels passively
    pub fn is_passive(&self) -> bool {
        self.passive
    }

    /// Whether the session uses the extended (EPRT/EPSV) command forms
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Echo replies to stdout as they arrive
    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    /// Flip passive mode, refusing a switch that leaves no workable mode
    pub fn toggle_passive(&mut self) -> std::result::Result<bool, &'static str> {
        if !self.passive {
            self.passive = true;
            return Ok(true);
        }
        if self.local_ip4.is_none() && self.local_ip6.is_none() {
            return Err("No local address is available; only passive mode can work.");
        }
        self.passive = false;
        if self.local_ip4.is_none() {
            // EPRT is the only viable active form without an IPv4 address
            self.extended = true;
        }
        Ok(false)
    }

    /// Flip extended mode, refusing a switch that leaves no workable mode
    pub fn toggle_extended(&mut self) -> std::result::Result<bool, &'static str> {
        if self.extended && !self.passive && self.local_ip4.is_none() {
            return Err("No IPv4 address is available; EPRT is the only workable mode.");
        }
        self.extended = !self.extended;
        Ok(self.extended)
    }

    /// Read one reply, surfacing 421 as the fatal service-unavailable error
    pub(crate) async fn read_checked_reply(&mut self) -> Result<Reply> {
        let reply = self.control.read_reply_timeout(REPLY_TIMEOUT).await?;
        if self.echo {
            println!("{}", reply);
        }
        if reply.matches(codes::SERVICE_NOT_AVAILABLE) {
            return Err(FtpError::ServiceUnavailable);
        }
        Ok(reply)
    }

    /// Local address usable for an active-mode listener, if any
    fn active_bind_addr(&self) -> Option<IpAddr> {
        if self.extended {
            self.local_ip6
                .map(IpAddr::V6)
                .or(self.local_ip4.map(IpAddr::V4))
        } else {
            self.local_ip4.map(IpAddr::V4)
        }
    }
}
