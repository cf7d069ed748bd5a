//! Unix Domain Socket communication for daemon control

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use super::IpcRequest;
use crate::application::{BridgeHandle, BridgeResponse};
use crate::domain::events::BridgeEvent;
use crate::infrastructure::BroadcastEventSink;

/// Socket file name inside the runtime directory
const SOCKET_NAME: &str = "mic-bridge.sock";

/// Socket path resolver
#[derive(Debug, Clone)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    /// Create socket path, preferring XDG_RUNTIME_DIR
    pub fn new() -> Self {
        let path = std::env::var("XDG_RUNTIME_DIR")
            .map(|dir| PathBuf::from(dir).join(SOCKET_NAME))
            .unwrap_or_else(|_| std::env::temp_dir().join(SOCKET_NAME));
        Self { path }
    }

    /// Use an explicit socket path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the socket path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if socket file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove socket file if it exists
    pub fn cleanup(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// Unix Domain Socket server exposing the bridge
pub struct UnixSocketServer {
    socket_path: SocketPath,
    listener: Option<UnixListener>,
}

impl UnixSocketServer {
    /// Create a new socket server
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            socket_path,
            listener: None,
        }
    }

    /// Bind the socket, replacing a stale socket file
    pub fn bind(&mut self) -> io::Result<()> {
        self.socket_path.cleanup()?;
        self.listener = Some(UnixListener::bind(self.socket_path.path())?);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.socket_path.path()
    }

    /// Accept connections until the task is dropped
    pub async fn run(&self, bridge: BridgeHandle, events: BroadcastEventSink) -> io::Result<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Socket not bound"))?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let bridge = bridge.clone();
                    let events = events.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, bridge, events).await {
                            debug!(error = %e, "Socket connection error");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "Socket accept error"),
            }
        }
    }

    /// Remove the socket file
    pub fn cleanup(&self) {
        let _ = self.socket_path.cleanup();
    }
}

impl Drop for UnixSocketServer {
    fn drop(&mut self) {
        if self.listener.is_some() {
            self.cleanup();
        }
    }
}

async fn write_line<T: serde::Serialize>(writer: &mut OwnedWriteHalf, value: &T) -> io::Result<()> {
    let mut line = serde_json::to_string(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

/// Handle a single client connection
async fn handle_connection(
    stream: UnixStream,
    bridge: BridgeHandle,
    events: BroadcastEventSink,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    match IpcRequest::parse(&line) {
        Ok(IpcRequest::Bridge(request)) => {
            let response = bridge
                .call(request)
                .await
                .unwrap_or_else(|e| BridgeResponse::error(e.to_string()));
            write_line(&mut writer, &response).await
        }
        Ok(IpcRequest::Listen) => stream_events(reader, writer, events).await,
        Err(message) => write_line(&mut writer, &BridgeResponse::error(message)).await,
    }
}

/// Forward every bridge event until the client hangs up.
///
/// The read half is watched for EOF so a departed listener releases its
/// subscription without waiting for the next event.
async fn stream_events(
    mut reader: BufReader<OwnedReadHalf>,
    mut writer: OwnedWriteHalf,
    events: BroadcastEventSink,
) -> io::Result<()> {
    let mut receiver = events.subscribe();
    let mut ignored = String::new();
    debug!("Event listener connected");
    loop {
        tokio::select! {
            read = reader.read_line(&mut ignored) => {
                if read? == 0 {
                    debug!("Event listener disconnected");
                    return Ok(());
                }
                ignored.clear();
            }
            received = receiver.recv() => match received {
                Ok(event) => write_line(&mut writer, &event).await?,
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event listener lagging"),
                Err(RecvError::Closed) => return Ok(()),
            },
        }
    }
}

/// Unix Domain Socket client for talking to the daemon
pub struct UnixSocketClient {
    socket_path: SocketPath,
}

impl UnixSocketClient {
    /// Create a new socket client
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }

    /// Check if daemon appears to be running (socket exists)
    pub fn is_daemon_running(&self) -> bool {
        self.socket_path.exists()
    }

    async fn send(
        &self,
        request: &IpcRequest,
    ) -> io::Result<(BufReader<OwnedReadHalf>, OwnedWriteHalf)> {
        let stream = UnixStream::connect(self.socket_path.path()).await?;
        let (reader, mut writer) = stream.into_split();

        let mut line = request
            .to_line()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;

        Ok((BufReader::new(reader), writer))
    }

    /// Send a request and read its reply
    pub async fn call(&self, request: &IpcRequest) -> io::Result<BridgeResponse> {
        let (mut reader, _writer) = self.send(request).await?;
        let mut response = String::new();
        reader.read_line(&mut response).await?;

        serde_json::from_str(response.trim())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Subscribe to bridge events, calling `on_event` for each until the
    /// daemon closes the connection
    pub async fn listen<F>(&self, mut on_event: F) -> io::Result<()>
    where
        F: FnMut(BridgeEvent),
    {
        // Dropping the write half would read as a hang-up on the daemon side
        let (reader, _writer) = self.send(&IpcRequest::Listen).await?;
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            match serde_json::from_str(&line) {
                Ok(event) => on_event(event),
                Err(e) => debug!(error = %e, "Skipping malformed event line"),
            }
        }
        Ok(())
    }
}
