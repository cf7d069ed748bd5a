//! Event sink port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::events::BridgeEvent;

/// Event delivery errors
#[derive(Debug, Clone, Error)]
pub enum EventSinkError {
    #[error("No event listeners connected")]
    NoListeners,

    #[error("Failed to deliver event: {0}")]
    SendFailed(String),
}

/// Port for the external event bus that receives completion and
/// cancellation events. Delivery is attempted once.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: &BridgeEvent) -> Result<(), EventSinkError>;
}
