//! `ftpclient <host> <logfile> [port]`: interactive FTP client
//!
//! Connects to the named server (port 21 by default), records every
//! control-channel exchange in the given log file, and drops into the
//! command prompt.

use ftp_rs::{FtpClient, FtpError, XferLog, client};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_COMMAND_PORT: u16 = 21;

struct CommandLine {
    host: String,
    logfile: String,
    port: u16,
}

fn parse_command_line() -> Result<CommandLine, FtpError> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: ftpclient <server> <logfile> [port]");
        return Err(FtpError::BadCommandLine);
    }

    let port = match args.get(3) {
        None => DEFAULT_COMMAND_PORT,
        Some(arg) => match arg.parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => {
                eprintln!("Port number must be positive.");
                return Err(FtpError::BadCommandLine);
            }
        },
    };

    Ok(CommandLine {
        host: args[1].clone(),
        logfile: args[2].clone(),
        port,
    })
}

async fn run() -> Result<(), FtpError> {
    let cmdline = parse_command_line()?;

    let log = Arc::new(XferLog::open(Path::new(&cmdline.logfile))?);
    let mut ftp = FtpClient::connect(&cmdline.host, cmdline.port, Some(log)).await?;
    ftp.set_echo(true);

    client::repl::run(&mut ftp).await
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
