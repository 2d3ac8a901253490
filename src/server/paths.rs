//! Rooted path resolution for session working directories
//!
//! Every path a client names is resolved against the session's current
//! working directory (unless absolute or tilde-rooted), then canonicalised
//! so the stored working directory is always absolute, symlink-free, and
//! contains no `..` components. A path that cannot be canonicalised (it
//! does not exist, or a `..` walks off the filesystem) is simply rejected.

use std::path::{Path, PathBuf};

/// Expand a client-supplied path against the working directory
///
/// `/`-prefixed paths stand alone; `~` and `~/…` root at the user's home
/// directory; everything else is relative to `cwd`.
pub(super) fn candidate(cwd: &Path, arg: &str) -> PathBuf {
    if arg.starts_with('/') {
        return PathBuf::from(arg);
    }
    if arg == "~" || arg.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            let mut path = PathBuf::from(home);
            if let Some(rest) = arg.strip_prefix("~/") {
                path.push(rest);
            }
            return path;
        }
    }
    cwd.join(arg)
}

/// Canonicalise a candidate and require it to be a directory
pub(super) async fn canonical_dir(path: &Path) -> std::io::Result<PathBuf> {
    let canonical = tokio::fs::canonicalize(path).await?;
    let metadata = tokio::fs::metadata(&canonical).await?;
    if !metadata.is_dir() {
        return Err(std::io::Error::from(std::io::ErrorKind::NotADirectory));
    }
    Ok(canonical)
}

/// Canonicalise a candidate that may be a file or a directory
pub(super) async fn canonical_entry(
    path: &Path,
) -> std::io::Result<(PathBuf, std::fs::Metadata)> {
    let canonical = tokio::fs::canonicalize(path).await?;
    let metadata = tokio::fs::metadata(&canonical).await?;
    Ok((canonical, metadata))
}
