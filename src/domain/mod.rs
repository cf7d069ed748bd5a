//! Domain layer - Core business logic
//!
//! Contains the recording state machine, value objects, event payloads
//! and domain errors. This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod events;
pub mod recording;

// Re-export common types
pub use config::BridgeConfig;
pub use error::*;
pub use events::{
    BridgeEvent, CancelReason, CancellationPayload, CompletionPayload, EventPayload,
    PendingStart, DEFAULT_EVENT_NAME,
};
pub use recording::{
    AudioFormat, ClosedSession, InvalidStateTransition, OutputTarget, RecordingSession,
    RecordingState,
};
