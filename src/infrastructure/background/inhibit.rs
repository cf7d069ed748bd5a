//! Wake lock through `systemd-inhibit`
//!
//! The lock is a `systemd-inhibit ... sleep <ceiling>` child. When the
//! ceiling elapses the child exits and a new one is spawned, so the lock is
//! bounded per acquisition and renewed for as long as the session is active.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::application::ports::{
    BackgroundSession, BackgroundSessionError, NotificationIcon, Notifier,
};

/// Binary providing the inhibitor lock
const INHIBIT_PROGRAM: &str = "systemd-inhibit";

/// A held inhibitor lock and its renewal task
struct WakeLock {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Keeps the machine from sleeping while a recording runs and announces
/// background recording with a desktop notification.
pub struct InhibitBackgroundSession {
    ceiling: Duration,
    notifier: Option<Box<dyn Notifier>>,
    lock: Option<WakeLock>,
    active: bool,
}

impl InhibitBackgroundSession {
    pub fn new(ceiling: Duration) -> Self {
        Self {
            ceiling,
            notifier: None,
            lock: None,
            active: false,
        }
    }

    /// Announce activation through `notifier`
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    fn inhibit_args(ceiling: Duration) -> Vec<String> {
        vec![
            "--what=sleep:idle".to_string(),
            "--who=mic-bridge".to_string(),
            "--why=Recording audio".to_string(),
            "--mode=block".to_string(),
            "sleep".to_string(),
            ceiling.as_secs().max(1).to_string(),
        ]
    }

    fn spawn_inhibitor(ceiling: Duration) -> std::io::Result<Child> {
        Command::new(INHIBIT_PROGRAM)
            .args(Self::inhibit_args(ceiling))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }

    /// Hold the lock, renewing it at every ceiling, until told to stop
    async fn hold(mut child: Child, ceiling: Duration, mut stop: oneshot::Receiver<()>) {
        loop {
            let stopped = tokio::select! {
                _ = &mut stop => true,
                status = child.wait() => {
                    debug!(?status, "Wake lock ceiling reached");
                    false
                }
            };

            if stopped {
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "Wake lock already gone");
                }
                return;
            }

            match Self::spawn_inhibitor(ceiling) {
                Ok(renewed) => child = renewed,
                Err(e) => {
                    warn!(error = %e, "Could not renew wake lock");
                    return;
                }
            }
        }
    }

    async fn announce(&self) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier
                .notify(
                    "Recording in background",
                    "Microphone recording keeps running while the screen is locked",
                    NotificationIcon::Recording,
                )
                .await
            {
                warn!(error = %e, "Background notification failed");
            }
        }
    }
}

#[async_trait]
impl BackgroundSession for InhibitBackgroundSession {
    async fn activate(&mut self) -> Result<(), BackgroundSessionError> {
        if self.active {
            return Ok(());
        }

        match Self::spawn_inhibitor(self.ceiling) {
            Ok(child) => {
                let (stop, stopped) = oneshot::channel();
                let task = tokio::spawn(Self::hold(child, self.ceiling, stopped));
                self.lock = Some(WakeLock { stop, task });
                info!(ceiling_secs = self.ceiling.as_secs(), "Wake lock acquired");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("{} not found; recording without a wake lock", INHIBIT_PROGRAM);
            }
            Err(e) => return Err(BackgroundSessionError::ActivationFailed(e.to_string())),
        }

        self.active = true;
        self.announce().await;
        Ok(())
    }

    async fn deactivate(&mut self) -> Result<(), BackgroundSessionError> {
        self.active = false;
        if let Some(lock) = self.lock.take() {
            // The task may already have ended when renewal failed
            let _ = lock.stop.send(());
            lock.task
                .await
                .map_err(|e| BackgroundSessionError::DeactivationFailed(e.to_string()))?;
            info!("Wake lock released");
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
