//! Recorder lifecycle use case

use std::path::PathBuf;

use chrono::Local;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::events::PendingStart;
use crate::domain::recording::{AudioFormat, OutputTarget, RecordingSession, RecordingState};

use super::ports::{AudioEncoder, BackgroundSession};

/// Settings for the recorder lifecycle
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Directory receiving the recordings
    pub output_dir: PathBuf,
    /// Encoding of the recordings
    pub format: AudioFormat,
}

impl RecorderConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: AudioFormat::aac_m4a(),
        }
    }
}

/// A recording that was finalized by `stop`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedRecording {
    /// Absolute path of the output file
    pub path: String,
    /// Caller id supplied at start
    pub id: Option<String>,
    /// Event name supplied at start
    pub event_name: Option<String>,
}

/// Recorder lifecycle.
///
/// Owns the encoder, the background session and the state machine. Every
/// operation is a silent no-op when the current state does not allow it.
/// Failures roll back to `Idle` and are recorded in `last_error`.
pub struct RecorderLifecycle<E, B>
where
    E: AudioEncoder,
    B: BackgroundSession,
{
    encoder: E,
    background: B,
    config: RecorderConfig,
    session: RecordingSession,
    last_recording: Option<String>,
    last_error: Option<String>,
}

impl<E, B> RecorderLifecycle<E, B>
where
    E: AudioEncoder,
    B: BackgroundSession,
{
    pub fn new(encoder: E, background: B, config: RecorderConfig) -> Self {
        Self {
            encoder,
            background,
            config,
            session: RecordingSession::new(),
            last_recording: None,
            last_error: None,
        }
    }

    /// Current state
    pub fn status(&self) -> RecordingState {
        self.session.state()
    }

    /// Path of the most recently completed recording
    pub fn last_recording(&self) -> Option<&str> {
        self.last_recording.as_deref()
    }

    /// Most recent recoverable failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    fn record_error(&mut self, message: String) {
        warn!(error = %message, "Recorder failure");
        self.last_error = Some(message);
    }

    /// Start a new recording.
    ///
    /// Returns `false` without side effects when not idle, and `false` after
    /// a full rollback when the output or encoder could not be set up.
    pub async fn start(&mut self, pending: PendingStart) -> bool {
        if !self.session.is_idle() {
            debug!(state = %self.session.state(), "Start ignored");
            return false;
        }

        if let Err(e) = fs::create_dir_all(&self.config.output_dir).await {
            self.record_error(format!(
                "Cannot create output directory {}: {}",
                self.config.output_dir.display(),
                e
            ));
            return false;
        }

        let dir = match fs::canonicalize(&self.config.output_dir).await {
            Ok(dir) => dir,
            Err(e) => {
                self.record_error(format!(
                    "Cannot resolve output directory {}: {}",
                    self.config.output_dir.display(),
                    e
                ));
                return false;
            }
        };

        let target = OutputTarget::timestamped(
            &dir,
            self.config.format.extension(),
            Local::now(),
            |p| p.exists(),
        );

        if let Err(e) = self.background.activate().await {
            self.record_error(e.to_string());
            self.deactivate_background().await;
            return false;
        }

        if let Err(e) = self.encoder.start(&target, &self.config.format).await {
            self.record_error(e.to_string());
            self.rollback(&target).await;
            return false;
        }

        if let Err(e) = self.session.begin(target.clone(), pending) {
            self.record_error(e.to_string());
            self.rollback(&target).await;
            return false;
        }

        info!(path = %target, format = %self.config.format, "Recording started");
        true
    }

    /// Undo a partially started recording
    async fn rollback(&mut self, target: &OutputTarget) {
        self.encoder.release().await;
        if fs::metadata(target.path()).await.is_ok() {
            if let Err(e) = fs::remove_file(target.path()).await {
                debug!(path = %target, error = %e, "Could not remove partial output");
            }
        }
        self.deactivate_background().await;
    }

    async fn deactivate_background(&mut self) {
        if let Err(e) = self.background.deactivate().await {
            warn!(error = %e, "Background session teardown failed");
        }
    }

    /// Pause an active recording
    pub async fn pause(&mut self) {
        if !self.session.is_recording() {
            debug!(state = %self.session.state(), "Pause ignored");
            return;
        }
        if !self.encoder.supports_pause() {
            debug!("Pause not supported on this platform");
            return;
        }
        if let Err(e) = self.encoder.pause().await {
            self.record_error(e.to_string());
            return;
        }
        if self.session.pause().is_ok() {
            info!("Recording paused");
        }
    }

    /// Resume a paused recording
    pub async fn resume(&mut self) {
        if !self.session.is_paused() {
            debug!(state = %self.session.state(), "Resume ignored");
            return;
        }
        if let Err(e) = self.encoder.resume().await {
            self.record_error(e.to_string());
            return;
        }
        if self.session.resume().is_ok() {
            info!("Recording resumed");
        }
    }

    /// Finalize the recording and return it.
    ///
    /// A paused encoder is resumed first. On finalize failure the recorder
    /// still ends up `Idle` but no path is produced.
    pub async fn stop(&mut self) -> Option<FinishedRecording> {
        let closed = match self.session.finish() {
            Ok(closed) => closed,
            Err(e) => {
                debug!(error = %e, "Stop ignored");
                return None;
            }
        };

        if closed.was_paused {
            if let Err(e) = self.encoder.resume().await {
                warn!(error = %e, "Resume before finalize failed");
            }
        }

        let finalized = self.encoder.stop().await;
        self.deactivate_background().await;

        if let Err(e) = finalized {
            self.record_error(e.to_string());
            self.encoder.release().await;
            return None;
        }

        let path = closed.output.to_path_string();
        info!(path = %path, "Recording finished");
        self.last_recording = Some(path.clone());

        Some(FinishedRecording {
            path,
            id: closed.id,
            event_name: closed.event_name,
        })
    }

    /// Tear down any active session and return to `Idle`
    pub async fn release(&mut self) {
        if let Some(output) = self.session.reset() {
            info!(path = %output, "Releasing active recording");
            self.encoder.release().await;
        }
        if self.background.is_active() {
            self.deactivate_background().await;
        }
    }

    /// An interruption began: pause defensively and remember whether to resume
    pub async fn interruption_began(&mut self) {
        match self.session.interrupt() {
            Ok(true) => {
                if self.encoder.supports_pause() {
                    if let Err(e) = self.encoder.pause().await {
                        warn!(error = %e, "Pause on interruption failed");
                    }
                }
                info!("Recording interrupted");
            }
            Ok(false) => debug!("Interruption while paused; auto-resume not armed"),
            Err(e) => debug!(error = %e, "Interruption ignored"),
        }
    }

    /// An interruption ended: resume if it paused an active recording
    pub async fn interruption_ended(&mut self, should_resume: bool) {
        if !self.session.is_paused() || !self.session.resume_after_interruption() {
            debug!(state = %self.session.state(), "Interruption end ignored");
            return;
        }
        if !should_resume {
            self.session.disarm_resume();
            info!("Interruption ended; staying paused");
            return;
        }

        if let Err(e) = self.background.activate().await {
            warn!(error = %e, "Could not reactivate audio session; staying paused");
            return;
        }
        if let Err(e) = self.encoder.resume().await {
            warn!(error = %e, "Could not resume after interruption; staying paused");
            return;
        }
        if self.session.resume().is_ok() {
            info!("Recording resumed after interruption");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{BackgroundSessionError, EncoderError};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Calls {
        log: Vec<String>,
    }

    type Shared = Arc<Mutex<Calls>>;

    fn calls(shared: &Shared) -> Vec<String> {
        shared.lock().unwrap().log.clone()
    }

    struct MockEncoder {
        calls: Shared,
        fail_start: bool,
        fail_stop: bool,
        fail_resume: bool,
        pause_supported: bool,
    }

    impl MockEncoder {
        fn new(calls: Shared) -> Self {
            Self {
                calls,
                fail_start: false,
                fail_stop: false,
                fail_resume: false,
                pause_supported: true,
            }
        }

        fn push(&self, call: &str) {
            self.calls.lock().unwrap().log.push(call.to_string());
        }
    }

    #[async_trait]
    impl AudioEncoder for MockEncoder {
        fn supports_pause(&self) -> bool {
            self.pause_supported
        }

        async fn start(
            &mut self,
            target: &OutputTarget,
            _format: &AudioFormat,
        ) -> Result<(), EncoderError> {
            self.push("encoder.start");
            // Leave a partial file behind like a real encoder would
            std::fs::write(target.path(), b"partial").unwrap();
            if self.fail_start {
                return Err(EncoderError::StartFailed("boom".into()));
            }
            Ok(())
        }

        async fn pause(&mut self) -> Result<(), EncoderError> {
            self.push("encoder.pause");
            Ok(())
        }

        async fn resume(&mut self) -> Result<(), EncoderError> {
            self.push("encoder.resume");
            if self.fail_resume {
                return Err(EncoderError::ResumeFailed("busy".into()));
            }
            Ok(())
        }

        async fn stop(&mut self) -> Result<(), EncoderError> {
            self.push("encoder.stop");
            if self.fail_stop {
                return Err(EncoderError::FinalizeFailed("truncated".into()));
            }
            Ok(())
        }

        async fn release(&mut self) {
            self.push("encoder.release");
        }
    }

    struct MockBackground {
        calls: Shared,
        active: bool,
        fail_activate: bool,
    }

    impl MockBackground {
        fn new(calls: Shared) -> Self {
            Self {
                calls,
                active: false,
                fail_activate: false,
            }
        }
    }

    #[async_trait]
    impl BackgroundSession for MockBackground {
        async fn activate(&mut self) -> Result<(), BackgroundSessionError> {
            self.calls.lock().unwrap().log.push("background.activate".into());
            if self.fail_activate {
                return Err(BackgroundSessionError::ActivationFailed("denied".into()));
            }
            self.active = true;
            Ok(())
        }

        async fn deactivate(&mut self) -> Result<(), BackgroundSessionError> {
            self.calls.lock().unwrap().log.push("background.deactivate".into());
            self.active = false;
            Ok(())
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn lifecycle(
        dir: &tempfile::TempDir,
        configure: impl FnOnce(&mut MockEncoder, &mut MockBackground),
    ) -> (RecorderLifecycle<MockEncoder, MockBackground>, Shared) {
        let shared: Shared = Arc::default();
        let mut encoder = MockEncoder::new(Arc::clone(&shared));
        let mut background = MockBackground::new(Arc::clone(&shared));
        configure(&mut encoder, &mut background);
        let recorder = RecorderLifecycle::new(encoder, background, RecorderConfig::new(dir.path()));
        (recorder, shared)
    }

    fn pending(id: &str) -> PendingStart {
        PendingStart::new(Some(id.to_string()), None)
    }

    #[tokio::test]
    async fn start_from_idle() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, shared) = lifecycle(&dir, |_, _| {});

        assert!(recorder.start(pending("a")).await);
        assert_eq!(recorder.status(), RecordingState::Recording);
        assert_eq!(calls(&shared), vec!["background.activate", "encoder.start"]);
    }

    #[tokio::test]
    async fn start_while_recording_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, shared) = lifecycle(&dir, |_, _| {});
        recorder.start(PendingStart::default()).await;

        assert!(!recorder.start(PendingStart::default()).await);
        assert_eq!(recorder.status(), RecordingState::Recording);
        assert_eq!(calls(&shared).len(), 2);
    }

    #[tokio::test]
    async fn start_while_paused_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, _) = lifecycle(&dir, |_, _| {});
        recorder.start(PendingStart::default()).await;
        recorder.pause().await;

        assert!(!recorder.start(PendingStart::default()).await);
        assert_eq!(recorder.status(), RecordingState::Paused);
    }

    #[tokio::test]
    async fn encoder_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, shared) = lifecycle(&dir, |e, _| e.fail_start = true);

        assert!(!recorder.start(pending("a")).await);
        assert_eq!(recorder.status(), RecordingState::Idle);
        assert!(recorder.last_error().unwrap().contains("boom"));
        assert_eq!(
            calls(&shared),
            vec![
                "background.activate",
                "encoder.start",
                "encoder.release",
                "background.deactivate"
            ]
        );
        // Partial output was removed
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn background_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, shared) = lifecycle(&dir, |_, b| b.fail_activate = true);

        assert!(!recorder.start(PendingStart::default()).await);
        assert_eq!(recorder.status(), RecordingState::Idle);
        assert!(!calls(&shared).contains(&"encoder.start".to_string()));
    }

    #[tokio::test]
    async fn pause_and_resume() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, _) = lifecycle(&dir, |_, _| {});
        recorder.start(PendingStart::default()).await;

        recorder.pause().await;
        assert_eq!(recorder.status(), RecordingState::Paused);

        recorder.resume().await;
        assert_eq!(recorder.status(), RecordingState::Recording);
    }

    #[tokio::test]
    async fn pause_unsupported_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, shared) = lifecycle(&dir, |e, _| e.pause_supported = false);
        recorder.start(PendingStart::default()).await;

        recorder.pause().await;
        assert_eq!(recorder.status(), RecordingState::Recording);
        assert!(!calls(&shared).contains(&"encoder.pause".to_string()));
    }

    #[tokio::test]
    async fn pause_and_resume_from_idle_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, shared) = lifecycle(&dir, |_, _| {});

        recorder.pause().await;
        recorder.resume().await;
        assert_eq!(recorder.status(), RecordingState::Idle);
        assert!(calls(&shared).is_empty());
    }

    #[tokio::test]
    async fn stop_returns_path_and_pending_data() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, _) = lifecycle(&dir, |_, _| {});
        recorder
            .start(PendingStart::new(Some("id-1".into()), Some("done".into())))
            .await;

        let finished = recorder.stop().await.unwrap();
        assert!(finished.path.ends_with(".m4a"));
        let root = std::fs::canonicalize(dir.path()).unwrap();
        assert!(finished.path.starts_with(&root.to_string_lossy().to_string()));
        assert_eq!(finished.id.as_deref(), Some("id-1"));
        assert_eq!(finished.event_name.as_deref(), Some("done"));
        assert_eq!(recorder.status(), RecordingState::Idle);
        assert_eq!(recorder.last_recording(), Some(finished.path.as_str()));
    }

    #[tokio::test]
    async fn stop_while_paused_resumes_first() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, shared) = lifecycle(&dir, |_, _| {});
        recorder.start(PendingStart::default()).await;
        recorder.pause().await;

        assert!(recorder.stop().await.is_some());
        let log = calls(&shared);
        let resume = log.iter().position(|c| c == "encoder.resume").unwrap();
        let stop = log.iter().position(|c| c == "encoder.stop").unwrap();
        assert!(resume < stop);
        assert_eq!(recorder.status(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn stop_while_idle_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, shared) = lifecycle(&dir, |_, _| {});

        assert!(recorder.stop().await.is_none());
        assert!(recorder.last_recording().is_none());
        assert!(calls(&shared).is_empty());
    }

    #[tokio::test]
    async fn finalize_failure_ends_idle_without_path() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, _) = lifecycle(&dir, |e, _| e.fail_stop = true);
        recorder.start(PendingStart::default()).await;

        assert!(recorder.stop().await.is_none());
        assert_eq!(recorder.status(), RecordingState::Idle);
        assert!(recorder.last_recording().is_none());
        assert!(recorder.last_error().unwrap().contains("truncated"));

        // Usable for a subsequent start
        assert!(recorder.start(PendingStart::default()).await);
    }

    #[tokio::test]
    async fn release_tears_down() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, shared) = lifecycle(&dir, |_, _| {});
        recorder.start(PendingStart::default()).await;

        recorder.release().await;
        assert_eq!(recorder.status(), RecordingState::Idle);
        let log = calls(&shared);
        assert!(log.contains(&"encoder.release".to_string()));
        assert_eq!(log.last().map(String::as_str), Some("background.deactivate"));
    }

    #[tokio::test]
    async fn interruption_pauses_and_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, _) = lifecycle(&dir, |_, _| {});
        recorder.start(PendingStart::default()).await;

        recorder.interruption_began().await;
        assert_eq!(recorder.status(), RecordingState::Paused);

        recorder.interruption_ended(true).await;
        assert_eq!(recorder.status(), RecordingState::Recording);
    }

    #[tokio::test]
    async fn interruption_while_user_paused_stays_paused() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, _) = lifecycle(&dir, |_, _| {});
        recorder.start(PendingStart::default()).await;
        recorder.pause().await;

        recorder.interruption_began().await;
        recorder.interruption_ended(true).await;
        assert_eq!(recorder.status(), RecordingState::Paused);
    }

    #[tokio::test]
    async fn interruption_end_without_resume_stays_paused() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, _) = lifecycle(&dir, |_, _| {});
        recorder.start(PendingStart::default()).await;

        recorder.interruption_began().await;
        recorder.interruption_ended(false).await;
        assert_eq!(recorder.status(), RecordingState::Paused);

        // A later resume signal no longer applies
        recorder.interruption_ended(true).await;
        assert_eq!(recorder.status(), RecordingState::Paused);
    }

    #[tokio::test]
    async fn failed_auto_resume_stays_paused_silently() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, _) = lifecycle(&dir, |e, _| e.fail_resume = true);
        recorder.start(PendingStart::default()).await;

        recorder.interruption_began().await;
        recorder.interruption_ended(true).await;
        assert_eq!(recorder.status(), RecordingState::Paused);
    }

    #[tokio::test]
    async fn interruption_while_idle_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, shared) = lifecycle(&dir, |_, _| {});

        recorder.interruption_began().await;
        recorder.interruption_ended(true).await;
        assert_eq!(recorder.status(), RecordingState::Idle);
        assert!(calls(&shared).is_empty());
    }

    #[tokio::test]
    async fn output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let shared: Shared = Arc::default();
        let mut recorder = RecorderLifecycle::new(
            MockEncoder::new(Arc::clone(&shared)),
            MockBackground::new(Arc::clone(&shared)),
            RecorderConfig::new(&nested),
        );

        assert!(recorder.start(PendingStart::default()).await);
        assert!(nested.is_dir());
    }
}
