//! FTP error types

use thiserror::Error;

/// FTP protocol and connection errors
///
/// Every variant is classified either fatal (the current session is torn
/// down) or non-fatal (the REPL or handler reports it and continues); see
/// [`FtpError::is_fatal`]. Each variant also carries a stable numeric kind
/// used as the process exit code on fatal paths.
#[derive(Error, Debug)]
pub enum FtpError {
    /// Command line did not parse
    #[error("Bad command line")]
    BadCommandLine,

    /// Could not open a local file (config, accounts, log)
    #[error("Could not open file: {0}")]
    FileOpen(std::io::Error),

    /// Could not write to the log file
    #[error("Could not write to log file: {0}")]
    FileWrite(std::io::Error),

    /// Could not create a socket
    #[error("Could not open socket: {0}")]
    SocketOpen(std::io::Error),

    /// Write on a socket failed or was short
    #[error("Could not write to socket")]
    SocketWrite,

    /// Read on a socket failed
    #[error("Could not read from socket: {0}")]
    SocketRead(std::io::Error),

    /// Peer closed the control connection mid-reply
    #[error("Connection closed")]
    SocketEof,

    /// Could not connect to the peer
    #[error("Could not connect to host: {0}")]
    Connection(std::io::Error),

    /// Could not bind the data-connection socket
    #[error("Could not bind to socket for data connection: {0}")]
    Bind(std::io::Error),

    /// Could not listen on the data-connection socket
    #[error("Could not listen on socket for data connection: {0}")]
    Listen(std::io::Error),

    /// Could not accept a connection on the data-connection socket
    #[error("Could not accept connections on the data connection socket: {0}")]
    Accept(std::io::Error),

    /// Could not resolve the given host
    #[error("Could not find the specified host")]
    Host,

    /// Server did not greet with 220
    #[error("Server not accepting connections")]
    Accepting,

    /// Authentication failed or a command was refused with 530
    #[error("Not logged in")]
    LogIn,

    /// Server replied 421 on the control connection
    #[error("Service not available")]
    ServiceUnavailable,

    /// Reply line did not start with a three-digit code
    #[error("Invalid reply: {0}")]
    InvalidReply(String),

    /// Command rejected by the peer; the session remains usable
    #[error("FTP error {code}: {message}")]
    NonFatal {
        /// Reply code the peer sent (4xx/5xx other than 421/530)
        code: u16,
        /// Reply text from the peer
        message: String,
    },

    /// Configuration file missing, malformed, or inconsistent
    #[error("Configuration file error: {0}")]
    Config(String),

    /// Could not spawn a session worker
    #[error("Could not spawn session task")]
    TaskSpawn,

    /// Peer went idle past the per-command read timeout
    #[error("Control connection timed out")]
    Timeout,

    /// Address argument or reply payload did not parse
    #[error("Malformed address argument: {0}")]
    Parse(String),
}

impl FtpError {
    /// Whether this error tears down the current session
    ///
    /// Data-channel establishment failures (bind/listen/accept/connect) and
    /// peer rejections leave the control connection usable, so the caller
    /// reports them and keeps going. Everything touching the control channel
    /// itself, or startup resources, is fatal.
    pub fn is_fatal(&self) -> bool {
        match self {
            FtpError::BadCommandLine
            | FtpError::FileOpen(_)
            | FtpError::FileWrite(_)
            | FtpError::SocketOpen(_)
            | FtpError::SocketWrite
            | FtpError::SocketEof
            | FtpError::Host
            | FtpError::Accepting
            | FtpError::ServiceUnavailable
            | FtpError::InvalidReply(_)
            | FtpError::Config(_)
            | FtpError::TaskSpawn
            | FtpError::Timeout => true,
            FtpError::SocketRead(_)
            | FtpError::Connection(_)
            | FtpError::Bind(_)
            | FtpError::Listen(_)
            | FtpError::Accept(_)
            | FtpError::LogIn
            | FtpError::NonFatal { .. }
            | FtpError::Parse(_) => false,
        }
    }

    /// Stable numeric kind, used as the process exit code on fatal paths
    pub fn exit_code(&self) -> i32 {
        match self {
            FtpError::BadCommandLine => 1,
            FtpError::FileOpen(_) => 2,
            FtpError::FileWrite(_) => 3,
            FtpError::SocketOpen(_) => 4,
            FtpError::SocketWrite => 5,
            FtpError::SocketRead(_) => 6,
            FtpError::Connection(_) => 7,
            FtpError::Bind(_) => 8,
            FtpError::Listen(_) => 9,
            FtpError::Accept(_) => 10,
            FtpError::Host => 11,
            FtpError::Accepting => 12,
            FtpError::LogIn => 13,
            FtpError::ServiceUnavailable => 14,
            FtpError::SocketEof => 15,
            FtpError::InvalidReply(_) => 16,
            FtpError::NonFatal { .. } => 17,
            FtpError::Config(_) => 18,
            FtpError::TaskSpawn => 19,
            FtpError::Timeout => 20,
            FtpError::Parse(_) => 21,
        }
    }
}

/// Result type alias using FtpError
pub type Result<T> = std::result::Result<T, FtpError>;
