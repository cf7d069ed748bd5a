//! PID file management for daemon mode

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// PID file name inside the runtime directory
const PID_FILE_NAME: &str = "mic-bridge.pid";

/// PID file for daemon mode
pub struct PidFile {
    path: PathBuf,
    // Set once this process wrote the file
    owned: AtomicBool,
}

impl PidFile {
    /// Create a PID file manager, preferring XDG_RUNTIME_DIR
    pub fn new() -> Self {
        let path = std::env::var("XDG_RUNTIME_DIR")
            .map(|dir| PathBuf::from(dir).join(PID_FILE_NAME))
            .unwrap_or_else(|_| std::env::temp_dir().join(PID_FILE_NAME));
        Self::with_path(path)
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            owned: AtomicBool::new(false),
        }
    }

    /// Get the PID file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PID of a live daemon owning the file, if any.
    /// A stale file is removed.
    pub fn is_running(&self) -> Option<u32> {
        let mut file = File::open(&self.path).ok()?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).ok()?;
        let pid: u32 = contents.trim().parse().ok()?;

        // Signal 0 only checks for existence
        match kill(Pid::from_raw(pid as i32), None::<Signal>) {
            Ok(()) => Some(pid),
            Err(nix::errno::Errno::ESRCH) => {
                let _ = fs::remove_file(&self.path);
                None
            }
            Err(_) => None,
        }
    }

    /// Acquire the PID file (fails if another daemon is running)
    pub fn acquire(&self) -> Result<(), PidFileError> {
        if let Some(pid) = self.is_running() {
            if pid != process::id() {
                return Err(PidFileError::AlreadyRunning(pid));
            }
        }

        let mut file = File::create(&self.path).map_err(|e| {
            PidFileError::WriteFailed(format!("Failed to create PID file: {}", e))
        })?;

        write!(file, "{}", process::id()).map_err(|e| {
            PidFileError::WriteFailed(format!("Failed to write PID: {}", e))
        })?;

        self.owned.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Release the PID file
    pub fn release(&self) -> Result<(), PidFileError> {
        self.owned.store(false, Ordering::SeqCst);
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                PidFileError::RemoveFailed(format!("Failed to remove PID file: {}", e))
            })?;
        }
        Ok(())
    }
}

impl Default for PidFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if self.owned.load(Ordering::SeqCst) {
            let _ = self.release();
        }
    }
}

/// PID file errors
#[derive(Debug, thiserror::Error)]
pub enum PidFileError {
    #[error("Another daemon is already running (PID: {0})")]
    AlreadyRunning(u32),

    #[error("Failed to write PID file: {0}")]
    WriteFailed(String),

    #[error("Failed to remove PID file: {0}")]
    RemoveFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_names_the_app() {
        let pid_file = PidFile::new();
        assert!(pid_file.path().ends_with(PID_FILE_NAME));
    }

    #[test]
    fn is_running_returns_none_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = PidFile::with_path(dir.path().join("missing.pid"));
        assert!(pid_file.is_running().is_none());
    }

    #[test]
    fn acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = PidFile::with_path(dir.path().join("bridge.pid"));

        pid_file.acquire().unwrap();
        assert_eq!(pid_file.is_running(), Some(process::id()));

        pid_file.release().unwrap();
        assert!(!pid_file.path().exists());
    }

    #[test]
    fn dropping_unowned_file_keeps_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.pid");
        fs::write(&path, "12345").unwrap();

        drop(PidFile::with_path(&path));
        assert!(path.exists());
    }

    #[test]
    fn garbage_pid_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.pid");
        fs::write(&path, "not-a-pid").unwrap();

        let pid_file = PidFile::with_path(&path);
        assert!(pid_file.is_running().is_none());
        assert!(pid_file.acquire().is_ok());
    }
}
