//! Interactive command loop
//!
//! Turns user keystrokes into protocol command sequences. Fatal errors
//! abort the loop and become the process exit code; non-fatal errors print
//! a one-line diagnostic and re-prompt. A 530 from the server drops the
//! session back to the login prompt.

use crate::commands;
use crate::error::{FtpError, Result};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use super::{FtpClient, LoginStep};

type InputLines = Lines<BufReader<Stdin>>;

fn prompt(text: &str) {
    print!("{text}");
    std::io::stdout().flush().ok();
}

/// Read one line of user input; `None` means stdin is closed
async fn next_input(lines: &mut InputLines) -> Option<String> {
    lines.next_line().await.ok().flatten()
}

/// Prompt for credentials and run the USER/PASS handshake
async fn login(client: &mut FtpClient, lines: &mut InputLines) -> Result<()> {
    prompt("Username: ");
    let Some(username) = next_input(lines).await else {
        return Ok(());
    };
    match client.send_user(username.trim()).await? {
        LoginStep::LoggedIn => Ok(()),
        LoginStep::NeedPassword => {
            prompt("Password: ");
            let Some(password) = next_input(lines).await else {
                return Ok(());
            };
            client.send_pass(password.trim()).await
        }
    }
}

/// Run the interactive session until `quit`, stdin EOF, or a fatal error
pub async fn run(client: &mut FtpClient) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // A rejected login is not the end: the user stays at the prompt and may
    // log in again, though most commands will keep answering 530
    match login(client, &mut lines).await {
        Ok(()) => {}
        Err(FtpError::LogIn) => println!("Log in failed."),
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => println!("{e}"),
    }

    loop {
        prompt("ftp> ");
        let Some(line) = next_input(&mut lines).await else {
            break;
        };
        let tokens = commands::tokenize(&line);
        if tokens.is_empty() {
            continue;
        }

        match dispatch(client, &tokens).await {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(FtpError::LogIn) => {
                println!("Not logged in.");
                match login(client, &mut lines).await {
                    Ok(()) => {}
                    Err(FtpError::LogIn) => println!("Log in failed."),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => println!("{e}"),
                }
            }
            Err(e) => println!("{e}"),
        }
    }
    Ok(())
}

/// Translate one user command; returns `true` when the session should end
async fn dispatch(client: &mut FtpClient, tokens: &[&str]) -> Result<bool> {
    debug!(?tokens, "dispatching user command");
    match tokens[0] {
        "cd" => {
            let Some(path) = tokens.get(1) else {
                println!("Usage: cd <directory>");
                return Ok(false);
            };
            client.cwd(path).await?;
        }
        "cdup" => client.cdup().await?,
        "pwd" => {
            client.pwd().await?;
        }
        "ls" => {
            let listing = client.list(tokens.get(1).copied()).await?;
            std::io::stdout().write_all(&listing).ok();
        }
        "get" => {
            let Some(remote) = tokens.get(1) else {
                println!("Usage: get <remote-file> [local-file]");
                return Ok(false);
            };
            let local = tokens.get(2).copied().unwrap_or(remote);
            client.retr_to_file(remote, Path::new(local)).await?;
        }
        "help" => {
            client.help().await?;
        }
        "passive" => match client.toggle_passive() {
            Ok(true) => println!("Passive mode on."),
            Ok(false) => println!("Passive mode off."),
            Err(message) => println!("{message}"),
        },
        "extended" => match client.toggle_extended() {
            Ok(true) => println!("Extended mode on."),
            Ok(false) => println!("Extended mode off."),
            Err(message) => println!("{message}"),
        },
        "quit" => {
            // The session is over either way; even a 421 here is moot
            client.quit().await.ok();
            return Ok(true);
        }
        _ => println!("Unrecognized command."),
    }
    Ok(false)
}
