//! Recorder bridge actor
//!
//! The bridge owns the lifecycle, the permission gate and the dispatcher.
//! It runs as a single task: requests, permission answers and interruption
//! notifications all arrive on one command channel and are applied in
//! order, so the state machine is never touched concurrently.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::events::{CancelReason, PendingStart};
use crate::domain::recording::RecordingState;

use super::dispatcher::CompletionDispatcher;
use super::gate::{GateDecision, PermissionGate, PermissionOutcome};
use super::ports::{
    AudioEncoder, BackgroundSession, EventSink, Interruption, MicrophonePermission,
};
use super::recorder::RecorderLifecycle;

/// Capacity of the command channel
const COMMAND_BUFFER: usize = 32;

/// Operations exposed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum BridgeRequest {
    Start {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<String>,
    },
    Stop,
    Pause,
    Resume,
    GetStatus,
    GetRecording,
}

/// Replies to [`BridgeRequest`]s
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BridgeResponse {
    Ack { ok: bool },
    Status { status: RecordingState },
    Recording { path: String },
    Error { error: String },
}

impl BridgeResponse {
    pub fn ack() -> Self {
        Self::Ack { ok: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

/// Messages processed by the bridge task
#[derive(Debug)]
pub enum BridgeCommand {
    Request {
        request: BridgeRequest,
        reply: oneshot::Sender<BridgeResponse>,
    },
    PermissionResolved(PermissionOutcome),
    Interruption(Interruption),
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Errors talking to the bridge task
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("Recorder bridge is not running")]
    Closed,

    #[error("Unexpected reply from recorder bridge: {0:?}")]
    UnexpectedResponse(BridgeResponse),
}

/// Cloneable handle for sending commands to a running bridge
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    commands: mpsc::Sender<BridgeCommand>,
}

impl BridgeHandle {
    /// Send a request and wait for its reply
    pub async fn call(&self, request: BridgeRequest) -> Result<BridgeResponse, BridgeError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(BridgeCommand::Request { request, reply })
            .await
            .map_err(|_| BridgeError::Closed)?;
        response.await.map_err(|_| BridgeError::Closed)
    }

    async fn expect_ack(&self, request: BridgeRequest) -> Result<(), BridgeError> {
        match self.call(request).await? {
            BridgeResponse::Ack { .. } => Ok(()),
            other => Err(BridgeError::UnexpectedResponse(other)),
        }
    }

    pub async fn start(&self, id: Option<String>, event: Option<String>) -> Result<(), BridgeError> {
        self.expect_ack(BridgeRequest::Start { id, event }).await
    }

    pub async fn stop(&self) -> Result<(), BridgeError> {
        self.expect_ack(BridgeRequest::Stop).await
    }

    pub async fn pause(&self) -> Result<(), BridgeError> {
        self.expect_ack(BridgeRequest::Pause).await
    }

    pub async fn resume(&self) -> Result<(), BridgeError> {
        self.expect_ack(BridgeRequest::Resume).await
    }

    pub async fn status(&self) -> Result<RecordingState, BridgeError> {
        match self.call(BridgeRequest::GetStatus).await? {
            BridgeResponse::Status { status } => Ok(status),
            other => Err(BridgeError::UnexpectedResponse(other)),
        }
    }

    /// Path of the last completed recording, empty if none
    pub async fn recording(&self) -> Result<String, BridgeError> {
        match self.call(BridgeRequest::GetRecording).await? {
            BridgeResponse::Recording { path } => Ok(path),
            other => Err(BridgeError::UnexpectedResponse(other)),
        }
    }

    /// Forward an interruption notification
    pub async fn interruption(&self, interruption: Interruption) -> Result<(), BridgeError> {
        self.commands
            .send(BridgeCommand::Interruption(interruption))
            .await
            .map_err(|_| BridgeError::Closed)
    }

    /// Release any active recording and stop the bridge task
    pub async fn shutdown(&self) -> Result<(), BridgeError> {
        let (reply, done) = oneshot::channel();
        self.commands
            .send(BridgeCommand::Shutdown { reply })
            .await
            .map_err(|_| BridgeError::Closed)?;
        done.await.map_err(|_| BridgeError::Closed)
    }

    /// Whether the bridge task is gone
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// The recorder bridge: one owned instance per daemon
pub struct RecorderBridge<E, B, P, S>
where
    E: AudioEncoder,
    B: BackgroundSession,
    P: MicrophonePermission + 'static,
    S: EventSink,
{
    lifecycle: RecorderLifecycle<E, B>,
    gate: PermissionGate<P>,
    dispatcher: CompletionDispatcher<S>,
    commands: mpsc::Receiver<BridgeCommand>,
    // Weak so that outstanding prompts do not keep the bridge alive
    loopback: mpsc::WeakSender<BridgeCommand>,
}

impl<E, B, P, S> RecorderBridge<E, B, P, S>
where
    E: AudioEncoder + 'static,
    B: BackgroundSession + 'static,
    P: MicrophonePermission + 'static,
    S: EventSink + 'static,
{
    /// Create a bridge and the handle that drives it
    pub fn new(
        lifecycle: RecorderLifecycle<E, B>,
        gate: PermissionGate<P>,
        dispatcher: CompletionDispatcher<S>,
    ) -> (Self, BridgeHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let bridge = Self {
            lifecycle,
            gate,
            dispatcher,
            commands: rx,
            loopback: tx.downgrade(),
        };
        (bridge, BridgeHandle { commands: tx })
    }

    /// Run the bridge on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process commands until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        info!("Recorder bridge running");
        while let Some(command) = self.commands.recv().await {
            match command {
                BridgeCommand::Request { request, reply } => {
                    let response = self.handle_request(request).await;
                    if reply.send(response).is_err() {
                        debug!("Caller went away before the reply");
                    }
                }
                BridgeCommand::PermissionResolved(outcome) => {
                    let decision = self.gate.prompt_resolved(outcome);
                    self.apply_decision(decision).await;
                }
                BridgeCommand::Interruption(Interruption::Began) => {
                    self.lifecycle.interruption_began().await;
                }
                BridgeCommand::Interruption(Interruption::Ended { should_resume }) => {
                    self.lifecycle.interruption_ended(should_resume).await;
                }
                BridgeCommand::Shutdown { reply } => {
                    self.lifecycle.release().await;
                    let _ = reply.send(());
                    info!("Recorder bridge stopped");
                    return;
                }
            }
        }
        self.lifecycle.release().await;
        info!("Recorder bridge stopped");
    }

    async fn handle_request(&mut self, request: BridgeRequest) -> BridgeResponse {
        debug!(?request, "Bridge request");
        match request {
            BridgeRequest::Start { id, event } => {
                self.handle_start(PendingStart::new(id, event)).await;
                BridgeResponse::ack()
            }
            BridgeRequest::Stop => {
                if let Some(finished) = self.lifecycle.stop().await {
                    self.dispatcher.completed(&finished).await;
                }
                BridgeResponse::ack()
            }
            BridgeRequest::Pause => {
                self.lifecycle.pause().await;
                BridgeResponse::ack()
            }
            BridgeRequest::Resume => {
                self.lifecycle.resume().await;
                BridgeResponse::ack()
            }
            BridgeRequest::GetStatus => BridgeResponse::Status {
                status: self.lifecycle.status(),
            },
            BridgeRequest::GetRecording => BridgeResponse::Recording {
                path: self.lifecycle.last_recording().unwrap_or_default().to_string(),
            },
        }
    }

    async fn handle_start(&mut self, pending: PendingStart) {
        if self.lifecycle.status() != RecordingState::Idle {
            debug!(state = %self.lifecycle.status(), "Start ignored");
            return;
        }
        let decision = self.gate.request_start_permission(pending).await;
        self.apply_decision(decision).await;
    }

    async fn apply_decision(&mut self, decision: GateDecision) {
        match decision {
            GateDecision::Granted(pending) => {
                if self.lifecycle.status() != RecordingState::Idle {
                    debug!("Granted start dropped: recorder no longer idle");
                    return;
                }
                if !self.lifecycle.start(pending.clone()).await {
                    self.dispatcher
                        .cancelled(CancelReason::StartFailed, &pending)
                        .await;
                }
            }
            GateDecision::Denied(pending) => {
                self.dispatcher
                    .cancelled(CancelReason::PermissionDenied, &pending)
                    .await;
            }
            GateDecision::Prompting(prompt) => {
                let loopback = self.loopback.clone();
                tokio::spawn(async move {
                    let outcome = prompt.await;
                    match loopback.upgrade() {
                        Some(tx) => {
                            if tx.send(BridgeCommand::PermissionResolved(outcome)).await.is_err() {
                                debug!("Bridge closed before permission answer");
                            }
                        }
                        None => debug!("Bridge closed before permission answer"),
                    }
                });
            }
            GateDecision::Busy => {}
        }
    }
}
