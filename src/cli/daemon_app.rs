//! Daemon app runner

use std::process::ExitCode;

use tracing::{debug, info};

use crate::application::ports::InterruptionMonitor;
use crate::application::{
    BridgeHandle, CompletionDispatcher, PermissionGate, RecorderBridge, RecorderConfig,
    RecorderLifecycle,
};
use crate::infrastructure::{
    create_background_session, create_notifier, BroadcastEventSink, CpalMicrophonePermission,
    CpalRouteMonitor, FfmpegEncoder,
};

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::args::DaemonOptions;
use super::ipc::{SocketPath, UnixSocketServer};
use super::pid_file::{PidFile, PidFileError};
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Run daemon mode
pub async fn run_daemon(options: DaemonOptions) -> ExitCode {
    let presenter = Presenter::new();

    // Acquire PID file
    let pid_file = PidFile::new();
    if let Err(e) = pid_file.acquire() {
        match e {
            PidFileError::AlreadyRunning(pid) => {
                presenter.error(&format!("Another daemon is already running (PID: {})", pid));
            }
            _ => presenter.error(&e.to_string()),
        }
        return ExitCode::from(EXIT_ERROR);
    }

    // Install signal handlers before anything can be left behind
    let mut shutdown = match ShutdownSignal::new() {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    // Create adapters
    let encoder = FfmpegEncoder::new(options.input_format.clone(), options.input_device.clone());
    let notifier = options.notify.then(create_notifier);
    let background =
        create_background_session(options.background, options.wake_lock_minutes, notifier);
    let events = BroadcastEventSink::default();

    // Wire the bridge
    let lifecycle = RecorderLifecycle::new(
        encoder,
        background,
        RecorderConfig::new(options.output_dir.clone()),
    );
    let gate = PermissionGate::new(CpalMicrophonePermission::new());
    let dispatcher = CompletionDispatcher::new(events.clone(), options.event_name.clone());
    let (bridge, handle) = RecorderBridge::new(lifecycle, gate, dispatcher);
    let bridge_task = bridge.spawn();

    // Setup socket server
    let socket_path = SocketPath::new();
    let mut server = UnixSocketServer::new(socket_path.clone());
    if let Err(e) = server.bind() {
        presenter.error(&format!("Failed to bind socket: {}", e));
        let _ = handle.shutdown().await;
        return ExitCode::from(EXIT_ERROR);
    }

    let server_handle = handle.clone();
    let server_events = events.clone();
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run(server_handle, server_events).await {
            debug!(error = %e, "Socket server stopped");
        }
    });

    let monitor_task = tokio::spawn(forward_interruptions(CpalRouteMonitor::new(), handle.clone()));

    presenter.daemon_status("Started, waiting for commands...");
    presenter.info(&format!(
        "PID: {} | Socket: {} | Output: {} | Background: {}",
        std::process::id(),
        socket_path.path().display(),
        options.output_dir.display(),
        if options.background { "on" } else { "off" },
    ));

    let signal = shutdown.recv().await;
    info!(%signal, "Shutdown requested");
    presenter.daemon_status("Shutting down...");

    // Release any active recording before the listeners go away
    monitor_task.abort();
    let released = handle.shutdown().await.is_ok();
    server_task.abort();
    let _ = server_task.await;
    let _ = bridge_task.await;
    let _ = pid_file.release();

    if released {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

/// Feed interruption notifications into the bridge until either side stops
async fn forward_interruptions<M: InterruptionMonitor>(mut monitor: M, bridge: BridgeHandle) {
    while let Some(interruption) = monitor.next_interruption().await {
        debug!(?interruption, "Interruption");
        if bridge.interruption(interruption).await.is_err() {
            break;
        }
    }
}
