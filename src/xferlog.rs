//! Append-only transfer log
//!
//! Both programs record every control-channel exchange in a plain text log:
//! one timestamped line per record, with `Sent:` / `Received:` prefixes for
//! wire traffic. The server shares one log across all session tasks, so the
//! file handle sits behind a mutex held only for the duration of a single
//! record write.

use crate::error::{FtpError, Result};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Shared append-only log file with timestamped records
#[derive(Debug)]
pub struct XferLog {
    file: Mutex<std::fs::File>,
}

impl XferLog {
    /// Open (creating if necessary) the log file at `path` in append mode
    pub fn open(path: &Path) -> Result<Self> {
        let mut options = std::fs::OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(path).map_err(FtpError::FileOpen)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Append one record: local timestamp, a space, the message, a newline
    pub fn write(&self, message: &str) -> Result<()> {
        let stamp = chrono::Local::now().format("%a %b %e %H:%M:%S %Y");
        // The lock covers exactly one formatted write so records from
        // concurrent sessions never interleave. A poisoned lock means a
        // writer panicked mid-record; keep logging anyway.
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(file, "{stamp} {message}").map_err(FtpError::FileWrite)
    }

    /// Record one line sent on the control connection
    pub fn sent(&self, line: &str) -> Result<()> {
        self.write(&format!("Sent: {}", line))
    }

    /// Record one line received on the control connection
    pub fn received(&self, line: &str) -> Result<()> {
        self.write(&format!("Received: {}", line))
    }
}
