//! FTP login handshake (USER/PASS)

use crate::commands;
use crate::error::{FtpError, Result};
use crate::reply::codes;
use tracing::debug;

use super::FtpClient;

/// Outcome of sending USER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    /// Server wants a PASS command next (331)
    NeedPassword,
    /// Server considers the session logged in already (230, 330, or 202)
    LoggedIn,
}

impl FtpClient {
    /// Send USER and classify the server's answer
    ///
    /// # Errors
    ///
    /// Returns [`FtpError::LogIn`] when the server refuses the user name.
    pub async fn send_user(&mut self, username: &str) -> Result<LoginStep> {
        debug!("logging in as {}", username);
        self.control.send_command(&commands::user(username)).await?;

        let reply = self.read_checked_reply().await?;
        if reply.matches(codes::NEED_PASSWORD) {
            return Ok(LoginStep::NeedPassword);
        }
        if reply.matches_any(&[
            codes::USER_LOGGED_IN,
            codes::USER_LOGGED_IN_LEGACY,
            codes::NOT_IMPLEMENTED_SUPERFLUOUS,
        ]) {
            return Ok(LoginStep::LoggedIn);
        }
        Err(FtpError::LogIn)
    }

    /// Send PASS to complete the handshake started by [`send_user`]
    ///
    /// `202` (command superfluous) counts as logged in, as do `230` and the
    /// legacy `330` some servers emit in its place.
    ///
    /// [`send_user`]: Self::send_user
    ///
    /// # Errors
    ///
    /// Returns [`FtpError::LogIn`] on a password mismatch.
    pub async fn send_pass(&mut self, password: &str) -> Result<()> {
        self.control.send_command(&commands::pass(password)).await?;

        let reply = self.read_checked_reply().await?;
        if reply.matches_any(&[
            codes::USER_LOGGED_IN,
            codes::USER_LOGGED_IN_LEGACY,
            codes::NOT_IMPLEMENTED_SUPERFLUOUS,
        ]) {
            debug!("login successful");
            return Ok(());
        }
        Err(FtpError::LogIn)
    }
}
