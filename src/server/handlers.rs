//! Command handlers for server sessions
//!
//! Each handler owns its replies: it writes exactly the codes its contract
//! names and returns `Err` only for control-channel failures, which end the
//! session. Commands that need a login answer 530 before anything else, so
//! a PORT issued before USER gets 530, not a syntax error.

use crate::error::Result;
use crate::netaddr;
use crate::reply::codes;
use crate::wire;
use std::net::IpAddr;
use tracing::{debug, warn};

use super::data;
use super::paths;
use super::session::{Session, SessionState};

const HELP_TEXT: &str =
    "Supported commands:\nUSER PASS CWD CDUP PWD PASV PORT EPRT LIST RETR HELP QUIT";

impl Session {
    pub(super) async fn user_cmd(&mut self, argv: &[&str]) -> Result<()> {
        if self.state.is_authenticated() {
            return self
                .control
                .send_reply(codes::USER_LOGGED_IN_LEGACY, "User already logged in.")
                .await;
        }
        if argv.len() < 2 {
            return self
                .control
                .send_reply(codes::SYNTAX_ERROR, "Syntax error in parameters or arguments.")
                .await;
        }
        match self.server.accounts.get(argv[1]) {
            None => {
                self.control
                    .send_reply(codes::NOT_LOGGED_IN, "Not logged in.")
                    .await
            }
            Some(account) => {
                self.state = SessionState::UserReceived(account.clone());
                self.control
                    .send_reply(codes::NEED_PASSWORD, "User name okay, need password.")
                    .await
            }
        }
    }

    pub(super) async fn pass_cmd(&mut self, argv: &[&str]) -> Result<()> {
        match &self.state {
            SessionState::Init => {
                self.control
                    .send_reply(codes::BAD_SEQUENCE, "Bad sequence of commands.")
                    .await
            }
            SessionState::Authenticated { .. } => {
                self.control
                    .send_reply(
                        codes::NOT_IMPLEMENTED_SUPERFLUOUS,
                        "Command superfluous; already logged in.",
                    )
                    .await
            }
            SessionState::UserReceived(account) => {
                if argv.len() < 2 {
                    return self
                        .control
                        .send_reply(
                            codes::SYNTAX_ERROR,
                            "Syntax error in parameters or arguments.",
                        )
                        .await;
                }
                if !account.password_matches(argv[1]) {
                    // Stay in UserReceived so the peer may retry PASS
                    return self
                        .control
                        .send_reply(codes::NOT_LOGGED_IN, "Not logged in.")
                        .await;
                }
                let account = account.clone();
                debug!("user {} logged in", account.username);
                self.state = SessionState::Authenticated {
                    account,
                    cwd: self.server.root.clone(),
                };
                self.control
                    .send_reply(codes::USER_LOGGED_IN, "User logged in, proceed.")
                    .await
            }
        }
    }

    pub(super) async fn cwd_cmd(&mut self, argv: &[&str]) -> Result<()> {
        let SessionState::Authenticated { cwd, .. } = &self.state else {
            return self
                .control
                .send_reply(codes::NOT_LOGGED_IN, "Not logged in.")
                .await;
        };
        if argv.len() < 2 {
            return self
                .control
                .send_reply(codes::SYNTAX_ERROR, "Syntax error in parameters or arguments.")
                .await;
        }

        let target = paths::candidate(cwd, argv[1]);
        match paths::canonical_dir(&target).await {
            Ok(resolved) => {
                if let SessionState::Authenticated { cwd, .. } = &mut self.state {
                    *cwd = resolved;
                }
                self.control
                    .send_reply(
                        codes::FILE_ACTION_COMPLETED,
                        "Requested file action okay, completed.",
                    )
                    .await
            }
            Err(_) => {
                self.control
                    .send_reply(
                        codes::FILE_UNAVAILABLE_PERMANENT,
                        "Requested action not taken; file unavailable.",
                    )
                    .await
            }
        }
    }

    pub(super) async fn cdup_cmd(&mut self) -> Result<()> {
        let SessionState::Authenticated { cwd, .. } = &self.state else {
            return self
                .control
                .send_reply(codes::NOT_LOGGED_IN, "Not logged in.")
                .await;
        };
        // At the filesystem root there is no parent to move to
        let Some(parent) = cwd.parent() else {
            return self
                .control
                .send_reply(
                    codes::FILE_UNAVAILABLE_PERMANENT,
                    "Requested action not taken; file unavailable.",
                )
                .await;
        };

        let parent = parent.to_path_buf();
        match paths::canonical_dir(&parent).await {
            Ok(resolved) => {
                if let SessionState::Authenticated { cwd, .. } = &mut self.state {
                    *cwd = resolved;
                }
                self.control
                    .send_reply(codes::COMMAND_OKAY, "Command okay.")
                    .await
            }
            Err(_) => {
                self.control
                    .send_reply(
                        codes::FILE_UNAVAILABLE_PERMANENT,
                        "Requested action not taken; file unavailable.",
                    )
                    .await
            }
        }
    }

    pub(super) async fn pwd_cmd(&mut self) -> Result<()> {
        let SessionState::Authenticated { cwd, .. } = &self.state else {
            return self
                .control
                .send_reply(codes::NOT_LOGGED_IN, "Not logged in.")
                .await;
        };
        let text = format!("\"{}\"", cwd.display());
        self.control.send_reply(codes::PATH_CREATED, &text).await
    }

    pub(super) async fn pasv_cmd(&mut self) -> Result<()> {
        if !self.state.is_authenticated() {
            return self
                .control
                .send_reply(codes::NOT_LOGGED_IN, "Not logged in.")
                .await;
        }
        if !self.server.pasv_enabled {
            return self
                .control
                .send_reply(codes::NOT_IMPLEMENTED, "Command not implemented.")
                .await;
        }

        // Advertise the address this control connection arrived on; fall
        // back to the address discovered at startup
        let advertised = match self.control.local_addr()?.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => self.server.ip4,
        };
        let Some(advertised) = advertised else {
            return self
                .control
                .send_reply(codes::NOT_IMPLEMENTED, "Passive mode requires an IPv4 address.")
                .await;
        };

        let (listener, port) = match data::passive_listener(IpAddr::V4(advertised)).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("passive listener failed: {}", e);
                return self
                    .control
                    .send_reply(codes::CANT_OPEN_DATA_CONNECTION, "Can't open data connection.")
                    .await;
            }
        };

        let text = format!(
            "Entering passive mode ({}).",
            netaddr::encode_host_port(advertised, port)
        );
        self.control
            .send_reply(codes::ENTERING_PASSIVE_MODE, &text)
            .await?;

        // The 227 is out; the peer connects next. A failed accept simply
        // leaves no staged socket and the next LIST/RETR answers 425.
        match data::accept_one(listener).await {
            Ok(stream) => self.data = Some(stream),
            Err(e) => warn!("no connection arrived on passive listener: {}", e),
        }
        Ok(())
    }

    pub(super) async fn port_cmd(&mut self, argv: &[&str]) -> Result<()> {
        if !self.state.is_authenticated() {
            return self
                .control
                .send_reply(codes::NOT_LOGGED_IN, "Not logged in.")
                .await;
        }
        if !self.server.port_enabled {
            return self
                .control
                .send_reply(codes::NOT_IMPLEMENTED, "Command not implemented.")
                .await;
        }
        if argv.len() < 2 {
            return self
                .control
                .send_reply(codes::SYNTAX_ERROR, "Syntax error in parameters or arguments.")
                .await;
        }

        let Ok((addr, port)) = netaddr::decode_host_port(argv[1]) else {
            return self
                .control
                .send_reply(codes::SYNTAX_ERROR, "Syntax error in parameters or arguments.")
                .await;
        };
        self.connect_back_and_stage(IpAddr::V4(addr), port).await
    }

    pub(super) async fn eprt_cmd(&mut self, argv: &[&str]) -> Result<()> {
        if !self.state.is_authenticated() {
            return self
                .control
                .send_reply(codes::NOT_LOGGED_IN, "Not logged in.")
                .await;
        }
        if !self.server.port_enabled {
            return self
                .control
                .send_reply(codes::NOT_IMPLEMENTED, "Command not implemented.")
                .await;
        }
        if argv.len() < 2 {
            return self
                .control
                .send_reply(codes::SYNTAX_ERROR, "Syntax error in parameters or arguments.")
                .await;
        }

        let Ok((addr, port)) = netaddr::parse_eprt(argv[1]) else {
            return self
                .control
                .send_reply(codes::SYNTAX_ERROR, "Syntax error in parameters or arguments.")
                .await;
        };
        self.connect_back_and_stage(addr, port).await
    }

    async fn connect_back_and_stage(&mut self, addr: IpAddr, port: u16) -> Result<()> {
        match data::connect_back(addr, port).await {
            Ok(stream) => {
                // At most one data socket per session; a replaced one closes
                self.data = Some(stream);
                self.control
                    .send_reply(codes::COMMAND_OKAY, "Command okay.")
                    .await
            }
            Err(e) => {
                warn!("could not connect data channel to {}:{}: {}", addr, port, e);
                self.control
                    .send_reply(codes::CANT_OPEN_DATA_CONNECTION, "Can't open data connection.")
                    .await
            }
        }
    }

    pub(super) async fn epsv_cmd(&mut self) -> Result<()> {
        self.control
            .send_reply(codes::NOT_IMPLEMENTED, "Command not implemented.")
            .await
    }

    pub(super) async fn list_cmd(&mut self, argv: &[&str]) -> Result<()> {
        if !self.state.is_authenticated() {
            return self
                .control
                .send_reply(codes::NOT_LOGGED_IN, "Not logged in.")
                .await;
        }
        let Some(mut data) = self.data.take() else {
            return self
                .control
                .send_reply(
                    codes::CANT_OPEN_DATA_CONNECTION,
                    "Can't open data connection; use PORT or PASV first.",
                )
                .await;
        };

        let listing = match self.build_listing(argv.get(1).copied()).await {
            Ok(listing) => listing,
            Err(_) => {
                return self
                    .control
                    .send_reply(
                        codes::LOCAL_ERROR,
                        "Requested action aborted; local error in processing.",
                    )
                    .await;
            }
        };

        self.control
            .send_reply(
                codes::TRANSFER_STARTING,
                "Data connection already open; transfer starting.",
            )
            .await?;
        if wire::write_all_and_close(&mut data, &listing).await.is_err() {
            return self
                .control
                .send_reply(
                    codes::LOCAL_ERROR,
                    "Requested action aborted; local error in processing.",
                )
                .await;
        }
        self.control
            .send_reply(codes::CLOSING_DATA_CONNECTION, "Closing data connection.")
            .await
    }

    /// Build the LIST payload: entry names, one per line, in enumeration
    /// order; a regular-file target yields its own name alone
    async fn build_listing(&self, target: Option<&str>) -> std::io::Result<Vec<u8>> {
        let SessionState::Authenticated { cwd, .. } = &self.state else {
            return Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        };
        let path = match target {
            Some(arg) => paths::candidate(cwd, arg),
            None => cwd.clone(),
        };

        let (canonical, metadata) = paths::canonical_entry(&path).await?;
        let mut out = Vec::new();
        if metadata.is_dir() {
            let mut entries = tokio::fs::read_dir(&canonical).await?;
            while let Some(entry) = entries.next_entry().await? {
                out.extend_from_slice(entry.file_name().as_encoded_bytes());
                out.push(b'\n');
            }
        } else if let Some(name) = canonical.file_name() {
            out.extend_from_slice(name.as_encoded_bytes());
            out.push(b'\n');
        }
        Ok(out)
    }

    pub(super) async fn retr_cmd(&mut self, argv: &[&str]) -> Result<()> {
        let SessionState::Authenticated { cwd, .. } = &self.state else {
            return self
                .control
                .send_reply(codes::NOT_LOGGED_IN, "Not logged in.")
                .await;
        };
        let target = argv.get(1).map(|arg| paths::candidate(cwd, arg));

        let Some(mut data) = self.data.take() else {
            return self
                .control
                .send_reply(
                    codes::CANT_OPEN_DATA_CONNECTION,
                    "Can't open data connection; use PORT or PASV first.",
                )
                .await;
        };
        let Some(target) = target else {
            return self
                .control
                .send_reply(codes::SYNTAX_ERROR, "Syntax error in parameters or arguments.")
                .await;
        };

        let contents = match paths::canonical_entry(&target).await {
            Ok((canonical, metadata)) if metadata.is_file() => {
                match tokio::fs::read(&canonical).await {
                    Ok(contents) => contents,
                    Err(_) => {
                        return self
                            .control
                            .send_reply(
                                codes::LOCAL_ERROR,
                                "Requested action aborted; local error in processing.",
                            )
                            .await;
                    }
                }
            }
            _ => {
                return self
                    .control
                    .send_reply(
                        codes::FILE_UNAVAILABLE_PERMANENT,
                        "Requested action not taken; file unavailable.",
                    )
                    .await;
            }
        };

        self.control
            .send_reply(
                codes::TRANSFER_STARTING,
                "Data connection already open; transfer starting.",
            )
            .await?;
        if wire::write_all_and_close(&mut data, &contents).await.is_err() {
            return self
                .control
                .send_reply(
                    codes::LOCAL_ERROR,
                    "Requested action aborted; local error in processing.",
                )
                .await;
        }
        self.control
            .send_reply(codes::CLOSING_DATA_CONNECTION, "Closing data connection.")
            .await
    }

    pub(super) async fn help_cmd(&mut self) -> Result<()> {
        self.control.send_reply(codes::HELP_MESSAGE, HELP_TEXT).await
    }

    pub(super) async fn quit_cmd(&mut self) -> Result<()> {
        self.state = SessionState::Init;
        self.control
            .send_reply(codes::CLOSING_CONNECTION, "Service closing control connection.")
            .await
    }
}
