//! ftp-rs: an interactive FTP client and a concurrent multi-user FTP server
//! speaking a subset of RFC 959 with the RFC 2428 EPRT/EPSV extensions.
//!
//! Both programs share one protocol core: the control-channel codec with
//! multi-line reply coalescing, the reply-code catalog, and the four-flavour
//! data-channel negotiation (PORT, EPRT, PASV, EPSV).

/// Account store and accounts-file loader
pub mod accounts;
/// FTP client session engine
pub mod client;
/// Command builders and command-line tokenization
pub mod commands;
/// Server configuration file
pub mod config;
mod error;
/// Local address discovery and data-channel address codecs
pub mod netaddr;
/// Reply types and status codes
pub mod reply;
/// FTP server engine
pub mod server;
/// Control- and data-channel wire codec
pub mod wire;
/// Append-only transfer log
pub mod xferlog;

pub use accounts::{Account, AccountsTable};
pub use client::{FtpClient, LoginStep};
pub use config::ServerConfig;
pub use error::{FtpError, Result};
pub use reply::{Reply, codes};
pub use server::FtpServer;
pub use wire::ControlChannel;
pub use xferlog::XferLog;
