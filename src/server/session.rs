//! Per-connection session state machine
//!
//! One [`Session`] owns each accepted control connection from accept to
//! close. Authentication progresses `Init → UserReceived → Authenticated`;
//! the working directory and the staged data socket exist only in the
//! authenticated state, so the "logged in implies an account is present"
//! invariant holds by construction rather than by runtime checks.

use crate::accounts::Account;
use crate::commands;
use crate::error::{FtpError, Result};
use crate::reply::codes;
use crate::wire::ControlChannel;
use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use super::FtpServer;

/// Per-command read timeout; an idle peer frees its worker instead of
/// holding it forever
pub(super) const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Authentication progress of one control connection
pub(super) enum SessionState {
    /// Connected, nothing sent yet
    Init,
    /// USER named a known account; waiting for PASS
    UserReceived(Account),
    /// Fully logged in with a live working directory
    Authenticated {
        /// The authenticated account
        account: Account,
        /// Canonical absolute working directory
        cwd: PathBuf,
    },
}

impl SessionState {
    pub(super) fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// One server-side control connection
pub(super) struct Session {
    pub(super) control: ControlChannel,
    pub(super) server: Arc<FtpServer>,
    pub(super) state: SessionState,
    /// Staged data socket, present only between a successful
    /// PORT/EPRT/PASV and the next data-transferring command
    pub(super) data: Option<TcpStream>,
    peer: SocketAddr,
}

impl Session {
    pub(super) fn new(server: Arc<FtpServer>, stream: TcpStream, peer: SocketAddr) -> Self {
        let sock = socket2::SockRef::from(&stream);
        if let Err(e) = sock.set_nodelay(true) {
            warn!("could not set TCP_NODELAY for {}: {}", peer, e);
        }
        Self {
            control: ControlChannel::with_log(stream, server.log.clone()),
            server,
            state: SessionState::Init,
            data: None,
            peer,
        }
    }

    /// Drive the session to completion and log the teardown
    ///
    /// All resources (control socket, staged data socket, working
    /// directory) are owned by `self` and released here on every exit
    /// path.
    pub(super) async fn run(mut self) {
        debug!("session started for {}", self.peer);
        match self.serve().await {
            Ok(()) => {}
            Err(FtpError::Timeout) => {
                info!("session for {} idled past the read timeout", self.peer);
            }
            Err(e) => warn!("session for {} ended with error: {}", self.peer, e),
        }
        self.server.log.write("Client quitting.").ok();
        debug!("session for {} closed", self.peer);
    }

    async fn serve(&mut self) -> Result<()> {
        self.control
            .send_reply(codes::SERVICE_READY, "Ready. Please send USER.")
            .await?;

        loop {
            let line = match self
                .control
                .read_command_timeout(self.server.read_timeout)
                .await
            {
                Ok(line) => line,
                // The peer hanging up is a normal way for a session to end
                Err(FtpError::SocketEof) => return Ok(()),
                Err(e) => return Err(e),
            };

            let argv = commands::tokenize(&line);
            if argv.is_empty() {
                self.control
                    .send_reply(codes::COMMAND_UNRECOGNIZED, "Command unrecognized.")
                    .await?;
                continue;
            }

            if let ControlFlow::Break(()) = self.dispatch(&argv).await? {
                return Ok(());
            }
        }
    }

    async fn dispatch(&mut self, argv: &[&str]) -> Result<ControlFlow<()>> {
        debug!("{} -> {}", self.peer, argv[0]);
        match argv[0] {
            "USER" => self.user_cmd(argv).await?,
            "PASS" => self.pass_cmd(argv).await?,
            "CWD" => self.cwd_cmd(argv).await?,
            "CDUP" => self.cdup_cmd().await?,
            "PWD" => self.pwd_cmd().await?,
            "PASV" => self.pasv_cmd().await?,
            "PORT" => self.port_cmd(argv).await?,
            "EPRT" => self.eprt_cmd(argv).await?,
            "EPSV" => self.epsv_cmd().await?,
            "LIST" => self.list_cmd(argv).await?,
            "RETR" => self.retr_cmd(argv).await?,
            "HELP" => self.help_cmd().await?,
            "QUIT" => {
                self.quit_cmd().await?;
                return Ok(ControlFlow::Break(()));
            }
            _ => {
                self.control
                    .send_reply(codes::NOT_IMPLEMENTED, "Command not implemented.")
                    .await?;
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}
