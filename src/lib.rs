//! mic-bridge - microphone recording bridge
//!
//! Records the microphone to mono AAC (`.m4a`, 44.1 kHz, 128 kbps) under a
//! guarded lifecycle and reports every finished recording to the host as a
//! completion event carrying the file path and MIME type.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Recording state machine, output format, event payloads, config
//! - **Application**: Port traits, the recorder lifecycle, the permission gate,
//!   the completion dispatcher and the bridge actor
//! - **Infrastructure**: Adapters (FFmpeg encoder, cpal device probing,
//!   systemd-inhibit wake lock, notify-rust, broadcast events, TOML config)
//! - **CLI**: Argument parsing, the daemon runner and its Unix socket endpoint

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
