//! Crash log redirection
//!
//! Points the process's stderr descriptor at a file so panics and anything
//! else written to fd 2 end up there.

use lograte_core::constants::LOG_FILE_MODE;
use lograte_core::{Error, Result};
use nix::libc::STDERR_FILENO;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use tracing::{info, warn};

/// Duplicate `path`'s descriptor onto stderr. Failures are logged and
/// returned; callers are free to carry on without the redirection.
pub fn crash_log(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(true)
        .mode(LOG_FILE_MODE)
        .open(path)
        .map_err(|e| {
            warn!("Failed to open crash log {}: {}", path.display(), e);
            Error::open_failed(path, e)
        })?;

    nix::unistd::dup2(file.as_raw_fd(), STDERR_FILENO).map_err(|e| {
        warn!("Failed to redirect stderr to {}: {}", path.display(), e);
        Error::CrashLog(format!("dup2 onto stderr failed for {}: {}", path.display(), e))
    })?;

    info!("Redirected stderr to {}", path.display());
    Ok(())
}
