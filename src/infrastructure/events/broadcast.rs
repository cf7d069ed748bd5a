//! In-process event bus on a tokio broadcast channel

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::application::ports::{EventSink, EventSinkError};
use crate::domain::events::BridgeEvent;

/// Events buffered per subscriber before it starts lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Fans bridge events out to every subscriber (IPC `listen` connections)
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<BridgeEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn emit(&self, event: &BridgeEvent) -> Result<(), EventSinkError> {
        self.sender
            .send(event.clone())
            .map(|_| ())
            .map_err(|_| EventSinkError::NoListeners)
    }
}
