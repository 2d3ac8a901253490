//! FTP reply types and status codes

use crate::error::{FtpError, Result};

/// FTP reply with three-digit status code and full message text
///
/// The text of a multi-line reply keeps its interior newlines; the final
/// terminator line (`code SP …`) is part of the text, exactly as it arrived
/// on the wire (minus line endings).
#[derive(Debug, Clone)]
pub struct Reply {
    /// 3-digit FTP reply code
    pub code: u16,
    /// Reply text; interior `\n` separators for multi-line replies
    pub text: String,
}

impl Reply {
    /// Check whether the reply carries the given code
    pub fn matches(&self, code: u16) -> bool {
        self.code == code
    }

    /// Check whether the reply carries any of the given codes
    pub fn matches_any(&self, codes: &[u16]) -> bool {
        codes.contains(&self.code)
    }

    /// Check if the reply indicates success (2xx)
    pub fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Check if the reply asks for further information (3xx)
    pub fn is_intermediate(&self) -> bool {
        self.code >= 300 && self.code < 400
    }

    /// Check if the reply indicates an error (4xx or 5xx)
    pub fn is_error(&self) -> bool {
        self.code >= 400
    }

    /// Whether this reply ends the session when seen on the control channel
    ///
    /// 421 always does. 5xx does too, except 530, which is recoverable on
    /// the client (drop back to the login prompt) and authoritative but
    /// non-terminal on the server.
    pub fn is_fatal_for_session(&self) -> bool {
        self.code == codes::SERVICE_NOT_AVAILABLE
            || (self.code >= 500 && self.code != codes::NOT_LOGGED_IN)
    }

    /// Convert an error reply into the matching error kind
    ///
    /// 421 becomes [`FtpError::ServiceUnavailable`], 530 becomes
    /// [`FtpError::LogIn`], any other 4xx/5xx becomes [`FtpError::NonFatal`].
    pub fn into_error(self) -> FtpError {
        match self.code {
            codes::SERVICE_NOT_AVAILABLE => FtpError::ServiceUnavailable,
            codes::NOT_LOGGED_IN => FtpError::LogIn,
            _ => FtpError::NonFatal {
                code: self.code,
                message: self.text,
            },
        }
    }
}

impl std::fmt::Display for Reply {
    /// Format the reply the way it looked on the wire, minus line endings
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.text.split_once('\n') {
            None => write!(f, "{} {}", self.code, self.text),
            Some((first, rest)) => write!(f, "{}-{}\n{}", self.code, first, rest),
        }
    }
}

/// Parse the code and remainder of a single reply line
///
/// The line must begin with three ASCII digits; the fourth byte, when
/// present, is `SP` for a final line or `-` for a continuation header.
pub fn parse_reply_line(line: &str) -> Result<(u16, &str)> {
    let bytes = line.as_bytes();
    if bytes.len() < 3
        || !bytes[0].is_ascii_digit()
        || !bytes[1].is_ascii_digit()
        || !bytes[2].is_ascii_digit()
    {
        return Err(FtpError::InvalidReply(line.chars().take(100).collect()));
    }

    // Safe to slice since we verified ASCII digits
    let code = line[0..3]
        .parse::<u16>()
        .map_err(|_| FtpError::InvalidReply(line.chars().take(100).collect()))?;

    let rest = if line.len() > 4 { &line[4..] } else { "" };
    Ok((code, rest))
}

/// Render a reply for the wire
///
/// Single-line text becomes `DDD SP text CRLF`. Text with interior newlines
/// becomes `DDD-first CRLF`, the remaining lines verbatim, and a final
/// `DDD SP CRLF` terminator, so a conforming reader coalesces the whole
/// block into one reply.
pub fn render(code: u16, text: &str) -> String {
    match text.split_once('\n') {
        None => format!("{code} {text}\r\n"),
        Some((first, rest)) => {
            let mut out = format!("{code}-{first}\r\n");
            for line in rest.split('\n') {
                out.push_str(line);
                out.push_str("\r\n");
            }
            out.push_str(&format!("{code} \r\n"));
            out
        }
    }
}

/// FTP reply codes (RFC 959)
#[allow(dead_code)]
pub mod codes {
    // 1xx - Positive preliminary
    /// Restart marker reply
    pub const RESTART: u16 = 110;
    /// Service ready in N minutes
    pub const SERVICE_READY_IN: u16 = 120;
    /// Data connection already open, transfer starting
    pub const TRANSFER_STARTING: u16 = 125;
    /// File status okay, about to open data connection
    pub const FILE_STATUS_OKAY: u16 = 150;

    // 2xx - Positive completion
    /// Command okay
    pub const COMMAND_OKAY: u16 = 200;
    /// Command not implemented, superfluous at this site
    pub const NOT_IMPLEMENTED_SUPERFLUOUS: u16 = 202;
    /// System status reply
    pub const SYSTEM_STATUS: u16 = 211;
    /// Directory status
    pub const DIRECTORY_STATUS: u16 = 212;
    /// File status
    pub const FILE_STATUS: u16 = 213;
    /// Help message
    pub const HELP_MESSAGE: u16 = 214;
    /// System name
    pub const SYSTEM_NAME: u16 = 215;
    /// Service ready for new user
    pub const SERVICE_READY: u16 = 220;
    /// Service closing control connection
    pub const CLOSING_CONNECTION: u16 = 221;
    /// Data connection open, no transfer in progress
    pub const CONNECTION_OPEN_NO_TRANSFER: u16 = 225;
    /// Closing data connection, requested action successful
    pub const CLOSING_DATA_CONNECTION: u16 = 226;
    /// Entering passive mode (h1,h2,h3,h4,p1,p2)
    pub const ENTERING_PASSIVE_MODE: u16 = 227;
    /// Entering extended passive mode (|||port|) (RFC 2428)
    pub const ENTERING_EXTENDED_PASSIVE_MODE: u16 = 229;
    /// User logged in, proceed
    pub const USER_LOGGED_IN: u16 = 230;
    /// Requested file action okay, completed
    pub const FILE_ACTION_COMPLETED: u16 = 250;
    /// "PATHNAME" created (also used for PWD)
    pub const PATH_CREATED: u16 = 257;

    // 3xx - Positive intermediate
    /// Some servers emit this in place of 230 after a successful PASS
    pub const USER_LOGGED_IN_LEGACY: u16 = 330;
    /// User name okay, need password
    pub const NEED_PASSWORD: u16 = 331;
    /// Need account for login
    pub const NEED_ACCOUNT: u16 = 332;
    /// Requested file action pending further information
    pub const PENDING_INFORMATION: u16 = 350;

    // 4xx - Transient negative
    /// Service not available, closing control connection
    pub const SERVICE_NOT_AVAILABLE: u16 = 421;
    /// Can't open data connection
    pub const CANT_OPEN_DATA_CONNECTION: u16 = 425;
    /// Connection closed, transfer aborted
    pub const CONNECTION_CLOSED: u16 = 426;
    /// Requested file action not taken, file unavailable
    pub const FILE_UNAVAILABLE: u16 = 450;
    /// Requested action aborted, local error in processing
    pub const LOCAL_ERROR: u16 = 451;
    /// Requested action not taken, insufficient storage
    pub const INSUFFICIENT_STORAGE: u16 = 452;

    // 5xx - Permanent negative
    /// Syntax error, command unrecognized
    pub const COMMAND_UNRECOGNIZED: u16 = 500;
    /// Syntax error in parameters or arguments
    pub const SYNTAX_ERROR: u16 = 501;
    /// Command not implemented
    pub const NOT_IMPLEMENTED: u16 = 502;
    /// Bad sequence of commands
    pub const BAD_SEQUENCE: u16 = 503;
    /// Command not implemented for that parameter
    pub const NOT_IMPLEMENTED_FOR_PARAMETER: u16 = 504;
    /// Not logged in
    pub const NOT_LOGGED_IN: u16 = 530;
    /// Need account for storing files
    pub const NEED_ACCOUNT_FOR_STORING: u16 = 532;
    /// Requested action not taken, file unavailable
    pub const FILE_UNAVAILABLE_PERMANENT: u16 = 550;
    /// Requested action aborted, page type unknown
    pub const ACTION_ABORTED: u16 = 551;
    /// Requested file action aborted, exceeded storage allocation
    pub const FILE_ACTION_ABORTED: u16 = 552;
    /// Requested action not taken, file name not allowed
    pub const FILE_NAME_NOT_ALLOWED: u16 = 553;
}
