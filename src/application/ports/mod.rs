//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod background;
pub mod config;
pub mod encoder;
pub mod event_sink;
pub mod interruption;
pub mod notifier;
pub mod permission;

// Re-export common types
pub use background::{BackgroundSession, BackgroundSessionError};
pub use config::ConfigStore;
pub use encoder::{AudioEncoder, EncoderError};
pub use event_sink::{EventSink, EventSinkError};
pub use interruption::{Interruption, InterruptionMonitor};
pub use notifier::{NotificationError, NotificationIcon, Notifier};
pub use permission::{MicrophonePermission, PermissionError, PermissionStatus};
