//! Completion dispatcher

use tracing::{info, warn};

use crate::domain::events::{
    BridgeEvent, CancelReason, CancellationPayload, CompletionPayload, PendingStart,
};

use super::ports::EventSink;
use super::recorder::FinishedRecording;

/// Packages recording outcomes and hands them to the event sink.
/// Delivery is attempted once; failures are logged and dropped.
pub struct CompletionDispatcher<S>
where
    S: EventSink,
{
    sink: S,
    default_event: String,
}

impl<S> CompletionDispatcher<S>
where
    S: EventSink,
{
    pub fn new(sink: S, default_event: impl Into<String>) -> Self {
        Self {
            sink,
            default_event: default_event.into(),
        }
    }

    fn event_name(&self, requested: Option<&str>) -> String {
        requested
            .filter(|name| !name.is_empty())
            .unwrap_or(self.default_event.as_str())
            .to_string()
    }

    /// Emit the completion event of a finished recording
    pub async fn completed(&self, recording: &FinishedRecording) -> BridgeEvent {
        let event = BridgeEvent::completed(
            self.event_name(recording.event_name.as_deref()),
            CompletionPayload::new(recording.path.clone(), recording.id.clone()),
        );
        self.deliver(&event).await;
        event
    }

    /// Emit the cancellation event of a start that did not happen
    pub async fn cancelled(&self, reason: CancelReason, pending: &PendingStart) -> BridgeEvent {
        let event = BridgeEvent::cancelled(
            self.event_name(pending.event.as_deref()),
            CancellationPayload::new(reason, pending.id.clone()),
        );
        self.deliver(&event).await;
        event
    }

    async fn deliver(&self, event: &BridgeEvent) {
        match self.sink.emit(event).await {
            Ok(()) => info!(event = %event.event, cancelled = event.payload.is_cancelled(), "Event dispatched"),
            Err(e) => warn!(event = %event.event, error = %e, "Event dropped"),
        }
    }
}
