//! Background session port interface

use async_trait::async_trait;
use thiserror::Error;

/// Background session errors
#[derive(Debug, Clone, Error)]
pub enum BackgroundSessionError {
    #[error("Failed to activate background session: {0}")]
    ActivationFailed(String),

    #[error("Failed to deactivate background session: {0}")]
    DeactivationFailed(String),
}

/// Port for the privileges that keep a recording alive while the device is
/// locked or idle (wake lock, foreground notification, audio session).
#[async_trait]
pub trait BackgroundSession: Send {
    /// Acquire the session. Calling it while active is a no-op.
    async fn activate(&mut self) -> Result<(), BackgroundSessionError>;

    /// Release the session. Calling it while inactive is a no-op.
    async fn deactivate(&mut self) -> Result<(), BackgroundSessionError>;

    fn is_active(&self) -> bool;
}

/// Blanket implementation for boxed session types
#[async_trait]
impl BackgroundSession for Box<dyn BackgroundSession> {
    async fn activate(&mut self) -> Result<(), BackgroundSessionError> {
        self.as_mut().activate().await
    }

    async fn deactivate(&mut self) -> Result<(), BackgroundSessionError> {
        self.as_mut().deactivate().await
    }

    fn is_active(&self) -> bool {
        self.as_ref().is_active()
    }
}
