//! `ftpserver <port>`: concurrent multi-user FTP server
//!
//! Configuration (log directory, accounts file, PORT/PASV enablement, and
//! the rotating log counter) comes from `.ftpdlog` in the working
//! directory.

use ftp_rs::{FtpError, FtpServer, config};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn parse_command_line() -> Result<u16, FtpError> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: ftpserver <port>");
        return Err(FtpError::BadCommandLine);
    }
    match args[1].parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => {
            eprintln!("Port number must be positive and less than {}.", u16::MAX);
            Err(FtpError::BadCommandLine)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let port = match parse_command_line() {
        Ok(port) => port,
        Err(e) => return ExitCode::from(e.exit_code() as u8),
    };

    let server = match FtpServer::initialize(Path::new(config::DEFAULT_CONFIG_FILE)).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    match server.run(port).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
