//! Capture device probing with cpal
//!
//! Desktop systems have no microphone prompt: access is available when the
//! default host exposes an input device.

mod permission;
mod route_monitor;

pub use permission::CpalMicrophonePermission;
pub use route_monitor::CpalRouteMonitor;

use cpal::traits::{DeviceTrait, HostTrait};

/// Name of the default input device, `None` when there is none
pub fn default_input_name() -> Option<String> {
    let host = cpal::default_host();
    let device = host.default_input_device()?;
    Some(device.name().unwrap_or_else(|_| "unknown input".to_string()))
}
