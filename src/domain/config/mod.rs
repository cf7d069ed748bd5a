//! Configuration value objects

mod bridge_config;

pub use bridge_config::{
    BridgeConfig, InputConfig, DEFAULT_INPUT_DEVICE, DEFAULT_INPUT_FORMAT,
    DEFAULT_WAKE_LOCK_MINUTES, MAX_WAKE_LOCK_MINUTES,
};
