//! Audio encoder port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::{AudioFormat, OutputTarget};

/// Encoder errors
#[derive(Debug, Clone, Error)]
pub enum EncoderError {
    #[error("Encoder binary not found: {0}")]
    NotFound(String),

    #[error("Failed to start encoder: {0}")]
    StartFailed(String),

    #[error("Failed to pause encoder: {0}")]
    PauseFailed(String),

    #[error("Failed to resume encoder: {0}")]
    ResumeFailed(String),

    #[error("Failed to finalize recording: {0}")]
    FinalizeFailed(String),

    #[error("No encoder is running")]
    NotRunning,
}

/// Port for the OS recording handle.
///
/// One implementation per platform; the recorder lifecycle owns exactly one
/// instance and is the only caller, so methods take `&mut self`.
#[async_trait]
pub trait AudioEncoder: Send {
    /// Whether `pause`/`resume` are available on this platform
    fn supports_pause(&self) -> bool;

    /// Open `target` and begin encoding in `format`.
    ///
    /// On error nothing may be left running.
    async fn start(&mut self, target: &OutputTarget, format: &AudioFormat)
        -> Result<(), EncoderError>;

    /// Pause encoding, keeping the output open
    async fn pause(&mut self) -> Result<(), EncoderError>;

    /// Resume a paused encoder
    async fn resume(&mut self) -> Result<(), EncoderError>;

    /// Finalize and close the output.
    /// The encoder must be active (not paused) when this is called.
    async fn stop(&mut self) -> Result<(), EncoderError>;

    /// Tear down whatever is running without finalizing. Best effort.
    async fn release(&mut self);
}
