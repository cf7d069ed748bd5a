//! Shared app plumbing: exit codes, logging and config loading

use tracing_subscriber::EnvFilter;

use crate::application::ports::ConfigStore;
use crate::domain::config::BridgeConfig;
use crate::infrastructure::XdgConfigStore;

use super::args::{DaemonArgs, DaemonOptions};
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Install the tracing subscriber on stderr.
/// `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "mic_bridge=debug"
    } else {
        "mic_bridge=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Config overrides given on the daemon command line
pub fn cli_config(args: &DaemonArgs) -> BridgeConfig {
    BridgeConfig {
        output_dir: args
            .output_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().to_string()),
        event_name: args.event_name.clone(),
        background: if args.background { Some(true) } else { None },
        wake_lock_minutes: args.wake_lock_minutes,
        notify: if args.no_notify { Some(false) } else { None },
        input: None,
    }
}

/// Load and merge configuration: defaults < file < CLI
pub async fn load_merged_config<S: ConfigStore>(
    store: &S,
    cli_config: BridgeConfig,
    presenter: &Presenter,
) -> BridgeConfig {
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            presenter.warn(&format!("Ignoring config file: {}", e));
            BridgeConfig::empty()
        }
    };

    BridgeConfig::defaults().merge(file_config).merge(cli_config)
}

/// Resolve the daemon options from a merged config
pub fn daemon_options(config: &BridgeConfig) -> DaemonOptions {
    DaemonOptions {
        output_dir: config.output_dir_or(crate::infrastructure::default_output_dir()),
        event_name: config.event_name_or_default().to_string(),
        background: config.background_or_default(),
        wake_lock_minutes: config.wake_lock_minutes_or_default(),
        notify: config.notify_or_default(),
        input_format: config.input_format_or_default().to_string(),
        input_device: config.input_device_or_default().to_string(),
    }
}

/// Load the daemon options for `args` from the default config store
pub async fn resolve_daemon_options(args: &DaemonArgs, presenter: &Presenter) -> DaemonOptions {
    let store = XdgConfigStore::new();
    let config = load_merged_config(&store, cli_config(args), presenter).await;
    daemon_options(&config)
}
