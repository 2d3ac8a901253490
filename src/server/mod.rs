//! FTP server implementation
//!
//! [`FtpServer`] owns everything sessions share: the account table (read
//! without locks, immutable after startup), the transfer log (mutex-guarded
//! writes), the discovered addresses, and the PORT/PASV enablement flags.
//! Each accepted control connection gets its own tokio task; sessions never
//! communicate with one another.

mod data;
mod handlers;
mod paths;
mod session;

use crate::accounts::AccountsTable;
use crate::config::{MAX_LOG_FILES, ServerConfig};
use crate::error::{FtpError, Result};
use crate::netaddr;
use crate::xferlog::XferLog;
use session::Session;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Concurrent multi-user FTP server
///
/// # Example
///
/// ```no_run
/// use ftp_rs::FtpServer;
/// use std::path::Path;
///
/// # async fn example() -> ftp_rs::Result<()> {
/// let server = FtpServer::initialize(Path::new(".ftpdlog")).await?;
/// server.run(2121).await
/// # }
/// ```
#[must_use]
pub struct FtpServer {
    pub(crate) accounts: AccountsTable,
    pub(crate) log: Arc<XferLog>,
    pub(crate) ip4: Option<Ipv4Addr>,
    #[allow(dead_code)]
    pub(crate) ip6: Option<Ipv6Addr>,
    pub(crate) port_enabled: bool,
    pub(crate) pasv_enabled: bool,
    /// Launch directory; every session's working directory starts here
    pub(crate) root: PathBuf,
    pub(crate) read_timeout: Duration,
}

impl FtpServer {
    /// Read the configuration file and assemble the shared server state
    ///
    /// Opens this run's log file (pruning the one that fell out of the
    /// retention window), loads the account table, and discovers the local
    /// addresses used to advertise passive endpoints.
    pub async fn initialize(config_path: &Path) -> Result<Self> {
        let config = ServerConfig::load(config_path)?;

        std::fs::create_dir_all(&config.log_directory).map_err(FtpError::FileOpen)?;
        if config.num_log_files < MAX_LOG_FILES {
            std::fs::remove_file(config.expired_log_path()).ok();
        }
        let log = Arc::new(XferLog::open(&config.log_file_path())?);

        log.write("Getting local ips.")?;
        let (ip4, ip6) = netaddr::discover_local_addrs();

        let accounts = AccountsTable::load(&config.accounts_file).await.map_err(|_| {
            FtpError::Config(format!(
                "could not open username file: {}",
                config.accounts_file.display()
            ))
        })?;

        let root = std::env::current_dir()
            .and_then(std::fs::canonicalize)
            .map_err(FtpError::FileOpen)?;

        Ok(Self {
            accounts,
            log,
            ip4,
            ip6,
            port_enabled: config.port_enabled,
            pasv_enabled: config.pasv_enabled,
            root,
            read_timeout: session::DEFAULT_READ_TIMEOUT,
        })
    }

    /// Override the directory new sessions start in
    ///
    /// The working-directory invariant (absolute, canonical) is preserved:
    /// the given path is canonicalised if possible.
    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = std::fs::canonicalize(&root).unwrap_or(root);
        self
    }

    /// Override the per-command read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Bind the control port and serve until the process ends
    pub async fn run(self, port: u16) -> Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(FtpError::Bind)?;
        self.serve_on(listener).await
    }

    /// Serve connections arriving on an already-bound listener
    pub async fn serve_on(self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr().map_err(FtpError::Listen)?;
        info!("listening on {}", local);
        self.log.write(&format!("Listening on {local}."))?;

        let server = Arc::new(self);
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    info!("accepted control connection from {}", peer);
                    let server = Arc::clone(&server);
                    tokio::spawn(async move {
                        Session::new(server, stream, peer).run().await;
                    });
                }
                Err(e) => warn!("could not accept connection: {}", e),
            }
        }
    }
}
