//! Bridge configuration value object

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::events::DEFAULT_EVENT_NAME;

/// Default wake lock ceiling for background recording, in minutes
pub const DEFAULT_WAKE_LOCK_MINUTES: u64 = 10;

/// Upper bound for the wake lock ceiling (one day)
pub const MAX_WAKE_LOCK_MINUTES: u64 = 24 * 60;

/// Default FFmpeg input format for the current platform
#[cfg(target_os = "macos")]
pub const DEFAULT_INPUT_FORMAT: &str = "avfoundation";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_INPUT_FORMAT: &str = "pulse";

/// Default FFmpeg input device for the current platform
#[cfg(target_os = "macos")]
pub const DEFAULT_INPUT_DEVICE: &str = ":0";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_INPUT_DEVICE: &str = "default";

/// Capture input configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    pub format: Option<String>,
    pub device: Option<String>,
}

/// Bridge configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub output_dir: Option<String>,
    pub event_name: Option<String>,
    pub background: Option<bool>,
    pub wake_lock_minutes: Option<u64>,
    pub notify: Option<bool>,
    pub input: Option<InputConfig>,
}

impl BridgeConfig {
    /// Create config with default values.
    /// `output_dir` stays unset; the store resolves a platform default.
    pub fn defaults() -> Self {
        Self {
            output_dir: None,
            event_name: Some(DEFAULT_EVENT_NAME.to_string()),
            background: Some(false),
            wake_lock_minutes: Some(DEFAULT_WAKE_LOCK_MINUTES),
            notify: Some(true),
            input: Some(InputConfig {
                format: Some(DEFAULT_INPUT_FORMAT.to_string()),
                device: Some(DEFAULT_INPUT_DEVICE.to_string()),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            output_dir: other.output_dir.or(self.output_dir),
            event_name: other.event_name.or(self.event_name),
            background: other.background.or(self.background),
            wake_lock_minutes: other.wake_lock_minutes.or(self.wake_lock_minutes),
            notify: other.notify.or(self.notify),
            input: Self::merge_input_config(self.input, other.input),
        }
    }

    fn merge_input_config(
        base: Option<InputConfig>,
        other: Option<InputConfig>,
    ) -> Option<InputConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(InputConfig {
                format: o.format.or(b.format),
                device: o.device.or(b.device),
            }),
        }
    }

    /// Get output directory, or the given fallback if not set
    pub fn output_dir_or(&self, fallback: PathBuf) -> PathBuf {
        self.output_dir
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(fallback)
    }

    /// Get the default event name, or the built-in one if not set
    pub fn event_name_or_default(&self) -> &str {
        self.event_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_EVENT_NAME)
    }

    /// Get background setting, or false if not set
    pub fn background_or_default(&self) -> bool {
        self.background.unwrap_or(false)
    }

    /// Get wake lock ceiling in minutes; zero falls back to the default and
    /// larger values are capped at [`MAX_WAKE_LOCK_MINUTES`]
    pub fn wake_lock_minutes_or_default(&self) -> u64 {
        self.wake_lock_minutes
            .filter(|&m| m > 0)
            .unwrap_or(DEFAULT_WAKE_LOCK_MINUTES)
            .min(MAX_WAKE_LOCK_MINUTES)
    }

    /// Get notify setting, or true if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(true)
    }

    pub fn input_format_or_default(&self) -> &str {
        self.input
            .as_ref()
            .and_then(|i| i.format.as_deref())
            .unwrap_or(DEFAULT_INPUT_FORMAT)
    }

    pub fn input_device_or_default(&self) -> &str {
        self.input
            .as_ref()
            .and_then(|i| i.device.as_deref())
            .unwrap_or(DEFAULT_INPUT_DEVICE)
    }
}
