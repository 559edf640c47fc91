//! Single-instance lock using PID files
//!
//! Two processes running the startup sequence against the same data
//! directory would race on the storage file and the preference file.

use std::fs;
use std::path::{Path, PathBuf};

use liftoff_domain::{LiftoffError, Result};

const PID_FILE_NAME: &str = "liftoff.pid";

/// Held for the lifetime of the process; the PID file is removed on drop.
#[derive(Debug)]
pub struct InstanceLock {
    pid_file: PathBuf,
}

impl InstanceLock {
    /// Returns an error if another live process holds the lock. A PID file
    /// left behind by a dead process is replaced.
    pub fn acquire<P: AsRef<Path>>(lock_dir: P) -> Result<Self> {
        let lock_dir = lock_dir.as_ref();
        fs::create_dir_all(lock_dir).map_err(|e| {
            LiftoffError::Platform(format!(
                "Failed to create lock directory {}: {e}",
                lock_dir.display()
            ))
        })?;
        let pid_file = lock_dir.join(PID_FILE_NAME);

        if let Ok(content) = fs::read_to_string(&pid_file) {
            if let Ok(pid) = content.trim().parse::<u32>() {
                if pid == std::process::id() || is_process_running(pid) {
                    tracing::warn!(existing_pid = pid, "instance_lock.process_active");
                    return Err(LiftoffError::Platform(format!(
                        "Another instance is already running (PID: {pid})"
                    )));
                }
                tracing::warn!(stale_pid = pid, "instance_lock.stale_pid_file_detected");
            }
            if let Err(err) = fs::remove_file(&pid_file) {
                tracing::warn!(error = %err, path = %pid_file.display(), "instance_lock.remove_stale_pid_failed");
            }
        }

        let current_pid = std::process::id();
        fs::write(&pid_file, current_pid.to_string())
            .map_err(|e| LiftoffError::Platform(format!("Failed to create PID file: {e}")))?;

        tracing::info!(pid = current_pid, path = %pid_file.display(), "instance_lock.acquired");
        Ok(Self { pid_file })
    }

    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }
}

#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    #[cfg(target_os = "linux")]
    {
        Path::new("/proc").join(pid.to_string()).exists()
    }

    #[cfg(not(target_os = "linux"))]
    {
        // `kill -0` probes without delivering a signal
        std::process::Command::new("kill")
            .arg("-0")
            .arg(pid.to_string())
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

#[cfg(not(unix))]
fn is_process_running(pid: u32) -> bool {
    tracing::warn!(pid, "instance_lock.process_check_unsupported");
    false
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.pid_file) {
            tracing::warn!(error = %e, path = %self.pid_file.display(), "instance_lock.remove_pid_failed");
        } else {
            tracing::info!(path = %self.pid_file.display(), "instance_lock.released");
        }
    }
}
