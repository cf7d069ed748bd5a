//! FFmpeg-based AAC encoder adapter

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

use crate::application::ports::{AudioEncoder, EncoderError};
use crate::domain::recording::{AudioFormat, OutputTarget};

/// Default FFmpeg binary
pub const DEFAULT_FFMPEG_PROGRAM: &str = "ffmpeg";

/// Time FFmpeg gets to fail on a bad device before the start counts as good
const STARTUP_GRACE: Duration = Duration::from_millis(300);

/// Upper bound for FFmpeg to write the MP4 trailer after SIGINT
const FINALIZE_TIMEOUT: Duration = Duration::from_secs(10);

/// Records the capture device into an `.m4a` file through an FFmpeg child.
///
/// Pause and resume suspend the process with SIGSTOP/SIGCONT; the container
/// is finalized on SIGINT.
pub struct FfmpegEncoder {
    program: String,
    input_format: String,
    input_device: String,
    child: Option<Child>,
    output: Option<PathBuf>,
    paused: bool,
}

impl FfmpegEncoder {
    /// Create an encoder reading from the given FFmpeg input
    pub fn new(input_format: impl Into<String>, input_device: impl Into<String>) -> Self {
        Self {
            program: DEFAULT_FFMPEG_PROGRAM.to_string(),
            input_format: input_format.into(),
            input_device: input_device.into(),
            child: None,
            output: None,
            paused: false,
        }
    }

    /// Use a different FFmpeg binary
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Build FFmpeg args for recording
    fn build_ffmpeg_args(
        input_format: &str,
        input_device: &str,
        format: &AudioFormat,
        output_path: &Path,
    ) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            input_format.to_string(),
            "-i".to_string(),
            input_device.to_string(),
            "-ac".to_string(),
            format.channels().to_string(),
            "-ar".to_string(),
            format.sample_rate_hz().to_string(),
            "-c:a".to_string(),
            format.codec().as_str().to_string(),
            "-b:a".to_string(),
            format!("{}k", format.bitrate_bps() / 1000),
            "-y".to_string(),
            output_path.to_string_lossy().to_string(),
        ]
    }

    /// Spawn FFmpeg process
    fn spawn_ffmpeg(&self, args: &[String]) -> Result<Child, EncoderError> {
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncoderError::NotFound(self.program.clone())
                } else {
                    EncoderError::StartFailed(e.to_string())
                }
            })
    }

    /// Last line FFmpeg wrote to stderr
    async fn last_error_line(child: &mut Child) -> String {
        let mut buf = Vec::new();
        if let Some(mut stderr) = child.stderr.take() {
            let _ = stderr.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf)
            .lines()
            .last()
            .unwrap_or("unknown error")
            .to_string()
    }

    /// Send signal to FFmpeg process
    fn send_signal(child: &Child, sig: Signal) -> Result<(), String> {
        if let Some(id) = child.id() {
            signal::kill(Pid::from_raw(id as i32), sig)
                .map_err(|e| format!("Signal {} failed: {}", sig, e))?;
        }
        Ok(())
    }

    fn running(&self) -> Result<&Child, EncoderError> {
        self.child.as_ref().ok_or(EncoderError::NotRunning)
    }
}

#[async_trait]
impl AudioEncoder for FfmpegEncoder {
    fn supports_pause(&self) -> bool {
        true
    }

    async fn start(
        &mut self,
        target: &OutputTarget,
        format: &AudioFormat,
    ) -> Result<(), EncoderError> {
        if self.child.is_some() {
            return Err(EncoderError::StartFailed(
                "Recording already in progress".to_string(),
            ));
        }

        let args =
            Self::build_ffmpeg_args(&self.input_format, &self.input_device, format, target.path());
        debug!(program = %self.program, ?args, "Spawning encoder");
        let mut child = self.spawn_ffmpeg(&args)?;

        // A missing device makes FFmpeg exit almost immediately
        sleep(STARTUP_GRACE).await;
        match child.try_wait() {
            Ok(None) => {}
            Ok(Some(status)) => {
                let message = Self::last_error_line(&mut child).await;
                return Err(EncoderError::StartFailed(format!(
                    "FFmpeg exited with {}: {}",
                    status, message
                )));
            }
            Err(e) => {
                let _ = child.kill().await;
                return Err(EncoderError::StartFailed(e.to_string()));
            }
        }

        self.child = Some(child);
        self.output = Some(target.path().to_path_buf());
        self.paused = false;
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), EncoderError> {
        let child = self.running()?;
        Self::send_signal(child, Signal::SIGSTOP).map_err(EncoderError::PauseFailed)?;
        self.paused = true;
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), EncoderError> {
        let child = self.running()?;
        Self::send_signal(child, Signal::SIGCONT).map_err(EncoderError::ResumeFailed)?;
        self.paused = false;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EncoderError> {
        let mut child = self.child.take().ok_or(EncoderError::NotRunning)?;
        let output = self.output.take();

        if self.paused {
            // A stopped process cannot handle SIGINT
            Self::send_signal(&child, Signal::SIGCONT).map_err(EncoderError::FinalizeFailed)?;
            self.paused = false;
        }

        // SIGINT lets FFmpeg write the container trailer
        Self::send_signal(&child, Signal::SIGINT).map_err(EncoderError::FinalizeFailed)?;

        match timeout(FINALIZE_TIMEOUT, child.wait()).await {
            Ok(Ok(status)) => debug!(%status, "Encoder exited"),
            Ok(Err(e)) => return Err(EncoderError::FinalizeFailed(e.to_string())),
            Err(_) => {
                let _ = child.kill().await;
                return Err(EncoderError::FinalizeFailed(
                    "FFmpeg did not exit in time".to_string(),
                ));
            }
        }

        let path = output.ok_or_else(|| {
            EncoderError::FinalizeFailed("Output path not set".to_string())
        })?;
        let size = fs::metadata(&path)
            .await
            .map_err(|e| EncoderError::FinalizeFailed(format!("{}: {}", path.display(), e)))?
            .len();
        if size == 0 {
            return Err(EncoderError::FinalizeFailed(
                "Recording file is empty".to_string(),
            ));
        }

        Ok(())
    }

    async fn release(&mut self) {
        self.output = None;
        self.paused = false;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill encoder");
            }
        }
    }
}
