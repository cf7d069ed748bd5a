//! Microphone permission port interface

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Permission errors
#[derive(Debug, Clone, Error)]
pub enum PermissionError {
    #[error("Failed to query microphone permission: {0}")]
    QueryFailed(String),

    #[error("Failed to request microphone permission: {0}")]
    RequestFailed(String),
}

/// Current state of the microphone permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not been asked yet; a prompt is required
    Undetermined,
}

impl PermissionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Undetermined => "undetermined",
        }
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Port for checking and requesting microphone access
#[async_trait]
pub trait MicrophonePermission: Send + Sync {
    /// Check the permission without prompting.
    ///
    /// Implementations that probe devices must not block the runtime.
    async fn status(&self) -> Result<PermissionStatus, PermissionError>;

    /// Show the OS prompt and wait for the answer.
    ///
    /// The result may be produced on any thread.
    async fn request(&self) -> Result<bool, PermissionError>;
}
