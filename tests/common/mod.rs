//! Test doubles for the bridge ports

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use mic_bridge::application::ports::{
    AudioEncoder, BackgroundSession, BackgroundSessionError, EncoderError, EventSink,
    EventSinkError, MicrophonePermission, PermissionError, PermissionStatus,
};
use mic_bridge::application::{
    BridgeHandle, CompletionDispatcher, PermissionGate, RecorderBridge, RecorderConfig,
    RecorderLifecycle,
};
use mic_bridge::domain::events::BridgeEvent;
use mic_bridge::domain::recording::{AudioFormat, OutputTarget};

/// Ordered log of port calls shared between the doubles and the test
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: &str) {
        self.0.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }
}

/// Encoder that writes a small file instead of capturing audio
pub struct FakeEncoder {
    log: CallLog,
    fail_start: bool,
}

impl FakeEncoder {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_start: false,
        }
    }

    pub fn failing(log: CallLog) -> Self {
        Self {
            log,
            fail_start: true,
        }
    }
}

#[async_trait]
impl AudioEncoder for FakeEncoder {
    fn supports_pause(&self) -> bool {
        true
    }

    async fn start(
        &mut self,
        target: &OutputTarget,
        _format: &AudioFormat,
    ) -> Result<(), EncoderError> {
        self.log.push("encoder.start");
        if self.fail_start {
            return Err(EncoderError::StartFailed("device busy".into()));
        }
        std::fs::write(target.path(), b"ftypM4A ").map_err(|e| EncoderError::StartFailed(e.to_string()))
    }

    async fn pause(&mut self) -> Result<(), EncoderError> {
        self.log.push("encoder.pause");
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), EncoderError> {
        self.log.push("encoder.resume");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EncoderError> {
        self.log.push("encoder.stop");
        Ok(())
    }

    async fn release(&mut self) {
        self.log.push("encoder.release");
    }
}

/// Background session that only records its calls
pub struct FakeBackground {
    log: CallLog,
    active: bool,
}

impl FakeBackground {
    pub fn new(log: CallLog) -> Self {
        Self { log, active: false }
    }
}

#[async_trait]
impl BackgroundSession for FakeBackground {
    async fn activate(&mut self) -> Result<(), BackgroundSessionError> {
        self.log.push("background.activate");
        self.active = true;
        Ok(())
    }

    async fn deactivate(&mut self) -> Result<(), BackgroundSessionError> {
        self.log.push("background.deactivate");
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Permission with a fixed status; prompts wait for `answer` to be released
pub struct FakePermission {
    status: PermissionStatus,
    answer: bool,
    release: Option<Arc<Notify>>,
}

impl FakePermission {
    pub fn granted() -> Self {
        Self::with_status(PermissionStatus::Granted, true)
    }

    pub fn denied() -> Self {
        Self::with_status(PermissionStatus::Denied, false)
    }

    pub fn with_status(status: PermissionStatus, answer: bool) -> Self {
        Self {
            status,
            answer,
            release: None,
        }
    }

    /// Prompt that only answers once `release` is notified
    pub fn gated(answer: bool, release: Arc<Notify>) -> Self {
        Self {
            status: PermissionStatus::Undetermined,
            answer,
            release: Some(release),
        }
    }
}

#[async_trait]
impl MicrophonePermission for FakePermission {
    async fn status(&self) -> Result<PermissionStatus, PermissionError> {
        Ok(self.status)
    }

    async fn request(&self) -> Result<bool, PermissionError> {
        if let Some(release) = &self.release {
            release.notified().await;
        }
        Ok(self.answer)
    }
}

/// Sink collecting every emitted event
#[derive(Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<BridgeEvent>>>,
}

impl CollectingSink {
    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn emit(&self, event: &BridgeEvent) -> Result<(), EventSinkError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// A running bridge wired to test doubles
pub struct Harness {
    pub handle: BridgeHandle,
    pub log: CallLog,
    pub sink: CollectingSink,
    pub dir: tempfile::TempDir,
    pub task: tokio::task::JoinHandle<()>,
}

impl Harness {
    pub fn start(permission: FakePermission) -> Self {
        let log = CallLog::default();
        Self::with_encoder(permission, FakeEncoder::new(log.clone()), log)
    }

    pub fn with_encoder(permission: FakePermission, encoder: FakeEncoder, log: CallLog) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let sink = CollectingSink::default();

        let lifecycle = RecorderLifecycle::new(
            encoder,
            FakeBackground::new(log.clone()),
            RecorderConfig::new(dir.path()),
        );
        let gate = PermissionGate::new(permission);
        let dispatcher = CompletionDispatcher::new(sink.clone(), "recording-complete");
        let (bridge, handle) = RecorderBridge::new(lifecycle, gate, dispatcher);

        Self {
            handle,
            log,
            sink,
            dir,
            task: bridge.spawn(),
        }
    }
}

/// Poll `condition` until it holds or a second has passed
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
