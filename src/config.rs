//! Server configuration file
//!
//! The server reads a newline-delimited `key=value` file at startup
//! (comments begin with `#`). The `nextlognum` counter inside it rotates by
//! one, modulo [`MAX_LOG_FILES`], on every startup so each run logs to a
//! fresh file; the rewritten value is persisted back before any session is
//! accepted, which is the only time the file is ever written.

use crate::error::{FtpError, Result};
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the server's working directory
pub const DEFAULT_CONFIG_FILE: &str = ".ftpdlog";

/// Ceiling for `numlogfiles` and modulus for the rotating counter
pub const MAX_LOG_FILES: u16 = 1000;

const DEFAULT_LOG_DIR: &str = "logs";

/// Parsed server configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerConfig {
    /// Directory receiving rotated log files
    pub log_directory: PathBuf,
    /// Number of log files retained before old ones are pruned
    pub num_log_files: u16,
    /// Counter selecting this run's log file name
    pub next_log_num: u16,
    /// Path of the accounts file
    pub accounts_file: PathBuf,
    /// Whether PORT (and EPRT) commands are accepted
    pub port_enabled: bool,
    /// Whether PASV commands are accepted
    pub pasv_enabled: bool,
}

impl ServerConfig {
    /// Load the configuration at `path` and advance its rotating counter
    ///
    /// Unrecognised keys are rejected rather than ignored. Both `port_mode`
    /// and `pasv_mode` must be present and at least one must be `YES`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|_| {
            FtpError::Config(format!("could not open configuration file {}", path.display()))
        })?;

        let config = Self::parse(&contents)?;

        // Persist the advanced counter before any session starts
        let rotated = rotate_counter(&contents, config.next_log_num);
        std::fs::write(path, rotated).map_err(|_| {
            FtpError::Config("could not rewrite the nextlognum counter".to_string())
        })?;

        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        let mut log_directory: Option<PathBuf> = None;
        let mut num_log_files: Option<u16> = None;
        let mut next_log_num: Option<u16> = None;
        let mut accounts_file: Option<PathBuf> = None;
        let mut port_enabled: Option<bool> = None;
        let mut pasv_enabled: Option<bool> = None;

        for line in contents.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let (param, value) = line.split_once('=').ok_or_else(|| {
                FtpError::Config(format!(
                    "parameter is missing its associated value: {line:?}"
                ))
            })?;

            match param {
                "logdirectory" => log_directory = Some(PathBuf::from(value)),
                "numlogfiles" => {
                    let n: u16 = value.parse().map_err(|_| {
                        FtpError::Config(format!("'numlogfiles' is not a number: {value:?}"))
                    })?;
                    if n == 0 || n > MAX_LOG_FILES {
                        return Err(FtpError::Config(format!(
                            "'numlogfiles' must be greater than 0 and at most {MAX_LOG_FILES}"
                        )));
                    }
                    num_log_files = Some(n);
                }
                "nextlognum" => {
                    let parsed = value.parse::<u16>().ok();
                    match parsed {
                        Some(n) if value.len() == 3 && n < MAX_LOG_FILES => {
                            next_log_num = Some(n);
                        }
                        _ => {
                            return Err(FtpError::Config(format!(
                                "'nextlognum' has been corrupted; it must be three digits \
                                 between 000 and {}",
                                MAX_LOG_FILES - 1
                            )));
                        }
                    }
                }
                "usernamefile" => accounts_file = Some(PathBuf::from(value)),
                "port_mode" => port_enabled = Some(yes_no(value, "port_mode")?),
                "pasv_mode" => pasv_enabled = Some(yes_no(value, "pasv_mode")?),
                // Unknown keys are treated as corruption, not ignored
                _ => {
                    return Err(FtpError::Config(format!(
                        "unrecognized parameter {param:?} in the configuration file"
                    )));
                }
            }
        }

        let next_log_num = next_log_num.ok_or_else(|| {
            FtpError::Config("could not find the 'nextlognum' parameter".to_string())
        })?;
        let accounts_file = accounts_file.ok_or_else(|| {
            FtpError::Config("could not find the 'usernamefile' parameter".to_string())
        })?;
        let (Some(port_enabled), Some(pasv_enabled)) = (port_enabled, pasv_enabled) else {
            return Err(FtpError::Config(
                "the 'port_mode' and 'pasv_mode' parameters must both be set".to_string(),
            ));
        };
        if !port_enabled && !pasv_enabled {
            return Err(FtpError::Config(
                "either PORT or PASV must be enabled".to_string(),
            ));
        }

        Ok(Self {
            log_directory: log_directory.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            num_log_files: num_log_files.unwrap_or(MAX_LOG_FILES),
            next_log_num,
            accounts_file,
            port_enabled,
            pasv_enabled,
        })
    }

    /// Log file selected by the current counter, inside the log directory
    pub fn log_file_path(&self) -> PathBuf {
        self.log_directory.join(log_file_name(self.next_log_num))
    }

    /// Log file that falls out of the retention window this run, if the
    /// window has wrapped
    pub fn expired_log_path(&self) -> PathBuf {
        let expired =
            (self.next_log_num + MAX_LOG_FILES - self.num_log_files) % MAX_LOG_FILES;
        self.log_directory.join(log_file_name(expired))
    }
}

/// Name of the log file for counter value `n`
pub fn log_file_name(n: u16) -> String {
    format!("ftpd{n:03}.log")
}

/// Replace the `nextlognum` value with `(current + 1) % MAX_LOG_FILES`,
/// leaving every other line untouched
fn rotate_counter(contents: &str, current: u16) -> String {
    let next = (current + 1) % MAX_LOG_FILES;
    let mut out = String::with_capacity(contents.len());
    for line in contents.lines() {
        if line.starts_with("nextlognum=") {
            out.push_str(&format!("nextlognum={next:03}"));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

fn yes_no(value: &str, param: &str) -> Result<bool> {
    match value {
        "YES" => Ok(true),
        "NO" => Ok(false),
        _ => Err(FtpError::Config(format!(
            "the {param:?} parameter must be either 'YES' or 'NO'"
        ))),
    }
}
