//! Client command handler - talks to the running daemon via IPC

use crate::application::BridgeResponse;

use super::ipc::{IpcRequest, SocketPath, UnixSocketClient};
use super::presenter::Presenter;

/// Send `request` to the daemon and present the reply
pub async fn handle_client_command(
    request: IpcRequest,
    presenter: &Presenter,
) -> Result<(), String> {
    let client = UnixSocketClient::new(SocketPath::new());

    if !client.is_daemon_running() {
        return Err("No daemon running. Start with: mic-bridge daemon".to_string());
    }

    if request == IpcRequest::Listen {
        return client
            .listen(|event| match serde_json::to_string(&event) {
                Ok(line) => presenter.output(&line),
                Err(e) => presenter.warn(&format!("Unprintable event: {}", e)),
            })
            .await
            .map_err(|e| format!("Lost connection to daemon: {}", e));
    }

    let response = client
        .call(&request)
        .await
        .map_err(|e| format!("Failed to communicate with daemon: {}", e))?;

    present_response(response, presenter)
}

fn present_response(response: BridgeResponse, presenter: &Presenter) -> Result<(), String> {
    match response {
        BridgeResponse::Ack { .. } => presenter.success("Command sent"),
        BridgeResponse::Status { status } => {
            presenter.info(&presenter.format_state(status));
            presenter.output(status.as_str());
        }
        BridgeResponse::Recording { path } if path.is_empty() => {
            presenter.info("No recording yet");
            presenter.output("");
        }
        BridgeResponse::Recording { path } => presenter.output(&path),
        BridgeResponse::Error { error } => return Err(error),
    }
    Ok(())
}
