//! IPC (Inter-Process Communication) module for daemon control
//!
//! One JSON object per line. A connection carries a single request and
//! its reply, except `listen`, which keeps the connection open and
//! streams bridge events.

#[cfg(unix)]
mod unix_socket;

#[cfg(unix)]
pub use unix_socket::{SocketPath, UnixSocketClient, UnixSocketServer};

use serde_json::Value;

use crate::application::BridgeRequest;

/// Method name of the event stream request
pub const LISTEN_METHOD: &str = "listen";

/// A request read from an IPC connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcRequest {
    /// Forwarded to the bridge
    Bridge(BridgeRequest),
    /// Subscribe to bridge events
    Listen,
}

impl IpcRequest {
    /// Parse one request line
    pub fn parse(line: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(line.trim()).map_err(|e| format!("Invalid JSON: {}", e))?;

        if value.get("method").and_then(Value::as_str) == Some(LISTEN_METHOD) {
            return Ok(Self::Listen);
        }

        serde_json::from_value(value)
            .map(Self::Bridge)
            .map_err(|e| format!("Invalid request: {}", e))
    }

    /// Encode as one request line (without the newline)
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Bridge(request) => serde_json::to_string(request),
            Self::Listen => serde_json::to_string(&serde_json::json!({ "method": LISTEN_METHOD })),
        }
    }
}
