//! Bridge event payloads

use serde::{Deserialize, Serialize};
use std::fmt;

use super::recording::M4A_MIME_TYPE;

/// Event name used when the caller did not supply one
pub const DEFAULT_EVENT_NAME: &str = "recording-complete";

/// Caller-supplied data for a start request, carried across the permission
/// round trip and into the recording session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingStart {
    pub id: Option<String>,
    pub event: Option<String>,
}

impl PendingStart {
    pub fn new(id: Option<String>, event: Option<String>) -> Self {
        Self { id, event }
    }
}

/// Payload of a finished recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPayload {
    pub path: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl CompletionPayload {
    pub fn new(path: impl Into<String>, id: Option<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: M4A_MIME_TYPE.to_string(),
            id,
        }
    }
}

/// Why a start request did not produce a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    PermissionDenied,
    StartFailed,
}

impl CancelReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::StartFailed => "start_failed",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload of a start request that was cancelled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationPayload {
    pub cancelled: bool,
    pub reason: CancelReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl CancellationPayload {
    pub fn new(reason: CancelReason, id: Option<String>) -> Self {
        Self {
            cancelled: true,
            reason,
            id,
        }
    }
}

/// Either outcome of a recording attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Completed(CompletionPayload),
    Cancelled(CancellationPayload),
}

impl EventPayload {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// A named event handed to the external event sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeEvent {
    pub event: String,
    pub payload: EventPayload,
}

impl BridgeEvent {
    pub fn completed(event: impl Into<String>, payload: CompletionPayload) -> Self {
        Self {
            event: event.into(),
            payload: EventPayload::Completed(payload),
        }
    }

    pub fn cancelled(event: impl Into<String>, payload: CancellationPayload) -> Self {
        Self {
            event: event.into(),
            payload: EventPayload::Cancelled(payload),
        }
    }
}
