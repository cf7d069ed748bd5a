//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::application::BridgeRequest;
use crate::domain::config::MAX_WAKE_LOCK_MINUTES;

use super::ipc::IpcRequest;

/// mic-bridge - microphone recording bridge
#[derive(Parser, Debug)]
#[command(name = "mic-bridge")]
#[command(version)]
#[command(about = "Record the microphone to AAC/M4A and report finished recordings as events")]
#[command(long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the recorder bridge in the foreground
    Daemon(DaemonArgs),
    /// Start a recording
    Start {
        /// Identifier echoed back in the completion event
        #[arg(long, value_name = "ID")]
        id: Option<String>,
        /// Name of the completion event
        #[arg(long, value_name = "NAME")]
        event: Option<String>,
    },
    /// Stop the recording and emit the completion event
    Stop,
    /// Pause the recording
    Pause,
    /// Resume a paused recording
    Resume,
    /// Show the recorder state
    Status,
    /// Show the path of the last finished recording
    Recording,
    /// Print bridge events as JSON lines until interrupted
    Listen,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Commands {
    /// The IPC request a client command sends to the daemon
    pub fn ipc_request(&self) -> Option<IpcRequest> {
        let request = match self {
            Self::Start { id, event } => BridgeRequest::Start {
                id: id.clone(),
                event: event.clone(),
            },
            Self::Stop => BridgeRequest::Stop,
            Self::Pause => BridgeRequest::Pause,
            Self::Resume => BridgeRequest::Resume,
            Self::Status => BridgeRequest::GetStatus,
            Self::Recording => BridgeRequest::GetRecording,
            Self::Listen => return Some(IpcRequest::Listen),
            Self::Daemon(_) | Self::Config { .. } => return None,
        };
        Some(IpcRequest::Bridge(request))
    }
}

/// Daemon flags; each overrides the config file
#[derive(Args, Debug, Default)]
pub struct DaemonArgs {
    /// Keep recording while the system is idle or locked
    #[arg(long)]
    pub background: bool,

    /// Directory receiving the recordings
    #[arg(long, value_name = "DIR", env = "MIC_BRIDGE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Default completion event name
    #[arg(long, value_name = "NAME")]
    pub event_name: Option<String>,

    /// Wake lock ceiling for background recording, in minutes
    #[arg(
        long,
        value_name = "MINUTES",
        value_parser = clap::value_parser!(u64).range(1..=MAX_WAKE_LOCK_MINUTES)
    )]
    pub wake_lock_minutes: Option<u64>,

    /// Disable desktop notifications
    #[arg(long)]
    pub no_notify: bool,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Resolved daemon options
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    pub output_dir: PathBuf,
    pub event_name: String,
    pub background: bool,
    pub wake_lock_minutes: u64,
    pub notify: bool,
    pub input_format: String,
    pub input_device: String,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "output_dir",
    "event_name",
    "background",
    "wake_lock_minutes",
    "notify",
    "input.format",
    "input.device",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
