//! FTP command builders and command-line tokenization

/// Build USER command
pub fn user(username: &str) -> String {
    format!("USER {}\r\n", username)
}

/// Build PASS command
pub fn pass(password: &str) -> String {
    format!("PASS {}\r\n", password)
}

/// Build CWD command
pub fn cwd(path: &str) -> String {
    format!("CWD {}\r\n", path)
}

/// Build CDUP command
pub fn cdup() -> String {
    "CDUP\r\n".to_string()
}

/// Build PWD command
pub fn pwd() -> String {
    "PWD\r\n".to_string()
}

/// Build PASV command
pub fn pasv() -> String {
    "PASV\r\n".to_string()
}

/// Build EPSV command (RFC 2428)
pub fn epsv() -> String {
    "EPSV\r\n".to_string()
}

/// Build PORT command from a pre-encoded `h1,h2,h3,h4,p1,p2` tuple
pub fn port(tuple: &str) -> String {
    format!("PORT {}\r\n", tuple)
}

/// Build EPRT command from a pre-encoded `|proto|addr|port|` argument (RFC 2428)
pub fn eprt(arg: &str) -> String {
    format!("EPRT {}\r\n", arg)
}

/// Build LIST command, with or without a target path
pub fn list(path: Option<&str>) -> String {
    match path {
        Some(p) => format!("LIST {}\r\n", p),
        None => "LIST\r\n".to_string(),
    }
}

/// Build RETR command
pub fn retr(path: &str) -> String {
    format!("RETR {}\r\n", path)
}

/// Build HELP command
pub fn help() -> String {
    "HELP\r\n".to_string()
}

/// Build QUIT command
pub fn quit() -> String {
    "QUIT\r\n".to_string()
}

/// Split a received command line into verb and arguments
///
/// Runs of spaces collapse, so `"CWD   /tmp"` tokenizes the same as
/// `"CWD /tmp"`. Returns an empty vector for a blank line.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}
