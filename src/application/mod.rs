//! Application layer - Use cases and port interfaces
//!
//! Contains the recorder lifecycle, the permission gate, the completion
//! dispatcher and the bridge actor that ties them together.

pub mod bridge;
pub mod dispatcher;
pub mod gate;
pub mod ports;
pub mod recorder;

// Re-export use cases
pub use bridge::{BridgeCommand, BridgeError, BridgeHandle, BridgeRequest, BridgeResponse, RecorderBridge};
pub use dispatcher::CompletionDispatcher;
pub use gate::{GateDecision, PermissionGate, PermissionOutcome, PermissionPrompt};
pub use recorder::{FinishedRecording, RecorderConfig, RecorderLifecycle};
