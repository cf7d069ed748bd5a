//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! the IPC endpoint and the daemon runner.

pub mod app;
pub mod args;
pub mod config_cmd;
#[cfg(unix)]
pub mod daemon_app;
#[cfg(unix)]
pub mod daemon_cmd;
pub mod ipc;
#[cfg(unix)]
pub mod pid_file;
pub mod presenter;
#[cfg(unix)]
pub mod signals;

// Re-export commonly used types
pub use app::{init_logging, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, DaemonArgs, DaemonOptions};
#[cfg(unix)]
pub use daemon_app::run_daemon;
#[cfg(unix)]
pub use daemon_cmd::handle_client_command;
pub use presenter::Presenter;
