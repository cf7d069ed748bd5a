//! mic-bridge CLI entry point

use std::process::ExitCode;

use clap::Parser;

use mic_bridge::cli::{
    app::EXIT_ERROR,
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    init_logging,
    presenter::Presenter,
};
use mic_bridge::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let presenter = Presenter::new();

    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        command => run_platform(command, &presenter).await,
    }
}

#[cfg(unix)]
async fn run_platform(command: Commands, presenter: &Presenter) -> ExitCode {
    use mic_bridge::cli::{app::resolve_daemon_options, handle_client_command, run_daemon};

    if let Commands::Daemon(args) = &command {
        let options = resolve_daemon_options(args, presenter).await;
        return run_daemon(options).await;
    }

    let Some(request) = command.ipc_request() else {
        return ExitCode::SUCCESS;
    };
    match handle_client_command(request, presenter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            presenter.error(&e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(not(unix))]
async fn run_platform(_command: Commands, presenter: &Presenter) -> ExitCode {
    presenter.error("The recorder daemon requires a Unix platform");
    ExitCode::from(mic_bridge::cli::EXIT_USAGE_ERROR)
}
