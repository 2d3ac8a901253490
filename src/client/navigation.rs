//! Directory navigation and session-control verbs

use crate::commands;
use crate::error::Result;
use crate::reply::codes;

use super::FtpClient;

impl FtpClient {
    /// Change the remote working directory (`CWD`)
    pub async fn cwd(&mut self, path: &str) -> Result<()> {
        self.control.send_command(&commands::cwd(path)).await?;
        let reply = self.read_checked_reply().await?;
        if reply.matches(codes::FILE_ACTION_COMPLETED) {
            Ok(())
        } else {
            Err(reply.into_error())
        }
    }

    /// Move to the remote parent directory (`CDUP`)
    pub async fn cdup(&mut self) -> Result<()> {
        self.control.send_command(&commands::cdup()).await?;
        let reply = self.read_checked_reply().await?;
        if reply.matches(codes::COMMAND_OKAY) {
            Ok(())
        } else {
            Err(reply.into_error())
        }
    }

    /// Ask for the remote working directory (`PWD`), returning the reply text
    pub async fn pwd(&mut self) -> Result<String> {
        self.control.send_command(&commands::pwd()).await?;
        let reply = self.read_checked_reply().await?;
        if reply.matches(codes::PATH_CREATED) {
            Ok(reply.text)
        } else {
            Err(reply.into_error())
        }
    }

    /// Ask for the server's help text (`HELP`), returning the reply text
    pub async fn help(&mut self) -> Result<String> {
        self.control.send_command(&commands::help()).await?;
        let reply = self.read_checked_reply().await?;
        if reply.matches(codes::HELP_MESSAGE) {
            Ok(reply.text)
        } else {
            Err(reply.into_error())
        }
    }

    /// End the session (`QUIT`)
    ///
    /// The goodbye reply is read without the usual 421 fatality filter; the
    /// session is over either way.
    pub async fn quit(&mut self) -> Result<()> {
        self.control.send_command(&commands::quit()).await?;
        let reply = self.control.read_reply().await?;
        if self.echo {
            println!("{}", reply);
        }
        Ok(())
    }
}
