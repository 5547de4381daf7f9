// src/infra/daemon/process.rs

use std::path::{Path, PathBuf};

use crate::infra::errors::RecommendError;
use crate::infra::paths;

/// Write a PID file for the daemon, refusing if a live daemon owns it.
pub fn write_pid_file() -> Result<PathBuf, RecommendError> {
    let pid_path = paths::pid_file_path();
    claim_pid_file(&pid_path, std::process::id())?;
    Ok(pid_path)
}

/// Remove the PID file.
pub fn remove_pid_file() {
    let _ = std::fs::remove_file(paths::pid_file_path());
}

/// PID recorded in the PID file, if any.
pub fn read_pid() -> Option<u32> {
    read_pid_at(&paths::pid_file_path())
}

/// Check if a daemon is already running.
pub fn is_daemon_running() -> bool {
    read_pid().is_some_and(is_process_alive)
}

pub(crate) fn claim_pid_file(pid_path: &Path, pid: u32) -> Result<(), RecommendError> {
    if let Some(existing) = read_pid_at(pid_path) {
        if existing != pid && is_process_alive(existing) {
            return Err(RecommendError::DaemonRunning { pid: existing });
        }
    }
    if let Some(parent) = pid_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(pid_path, pid.to_string())?;
    Ok(())
}

fn read_pid_at(pid_path: &Path) -> Option<u32> {
    std::fs::read_to_string(pid_path)
        .ok()
        .and_then(|content| content.trim().parse::<u32>().ok())
}

pub(crate) fn is_process_alive(pid: u32) -> bool {
    #[cfg(unix)]
    {
        std::process::Command::new("kill")
            .args(["-0", &pid.to_string()])
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}

/// Ask a running daemon to shut down gracefully.
pub fn signal_stop(pid: u32) -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let status = std::process::Command::new("kill")
            .args(["-INT", &pid.to_string()])
            .status()?;
        if !status.success() {
            anyhow::bail!("kill -INT {pid} exited with {status}");
        }
        Ok(())
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
        anyhow::bail!("Daemon stop is only supported on Unix systems")
    }
}
