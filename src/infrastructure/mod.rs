//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces, integrating
//! with FFmpeg, cpal, systemd-inhibit and the desktop notification service.

pub mod background;
pub mod config;
pub mod device;
pub mod events;
pub mod notification;
pub mod recording;

// Re-export adapters
pub use background::{create_background_session, InhibitBackgroundSession, NoopBackgroundSession};
pub use config::{default_output_dir, XdgConfigStore};
pub use device::{CpalMicrophonePermission, CpalRouteMonitor};
pub use events::BroadcastEventSink;
pub use notification::{create_notifier, NotifyRustNotifier};
#[cfg(unix)]
pub use recording::FfmpegEncoder;
