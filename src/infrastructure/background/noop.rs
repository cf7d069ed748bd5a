//! Background session that holds nothing

use async_trait::async_trait;

use crate::application::ports::{BackgroundSession, BackgroundSessionError};

/// Used when background recording is disabled
#[derive(Debug, Default)]
pub struct NoopBackgroundSession {
    active: bool,
}

impl NoopBackgroundSession {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BackgroundSession for NoopBackgroundSession {
    async fn activate(&mut self) -> Result<(), BackgroundSessionError> {
        self.active = true;
        Ok(())
    }

    async fn deactivate(&mut self) -> Result<(), BackgroundSessionError> {
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
