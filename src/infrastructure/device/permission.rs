//! Microphone permission backed by input device availability

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::{MicrophonePermission, PermissionError, PermissionStatus};

use super::default_input_name;

/// Grants access whenever the default host has an input device
#[derive(Debug, Default)]
pub struct CpalMicrophonePermission;

impl CpalMicrophonePermission {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MicrophonePermission for CpalMicrophonePermission {
    async fn status(&self) -> Result<PermissionStatus, PermissionError> {
        // Device enumeration talks to the sound server synchronously
        let probed = tokio::task::spawn_blocking(default_input_name)
            .await
            .map_err(|e| PermissionError::QueryFailed(format!("Task join error: {}", e)))?;

        match probed {
            Some(name) => {
                debug!(device = %name, "Input device available");
                Ok(PermissionStatus::Granted)
            }
            None => Ok(PermissionStatus::Denied),
        }
    }

    async fn request(&self) -> Result<bool, PermissionError> {
        tokio::task::spawn_blocking(|| default_input_name().is_some())
            .await
            .map_err(|e| PermissionError::RequestFailed(format!("Task join error: {}", e)))
    }
}
