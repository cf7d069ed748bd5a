//! Input route monitor
//!
//! Polls the default input device. Losing or switching it interrupts the
//! recording; getting a device back ends the interruption.

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::application::ports::{Interruption, InterruptionMonitor};

use super::default_input_name;

/// Default polling period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub struct CpalRouteMonitor {
    interval: Duration,
    current: Option<String>,
    primed: bool,
    interrupted: bool,
}

impl CpalRouteMonitor {
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            current: None,
            primed: false,
            interrupted: false,
        }
    }

    /// Fold one probe result into the monitor state
    fn observe(&mut self, probed: Option<String>) -> Option<Interruption> {
        let previous = std::mem::replace(&mut self.current, probed);
        if !self.primed {
            self.primed = true;
            return None;
        }

        if self.interrupted {
            if self.current.is_some() {
                self.interrupted = false;
                info!(device = ?self.current, "Input route restored");
                return Some(Interruption::Ended {
                    should_resume: true,
                });
            }
            return None;
        }

        if previous.is_some() && previous != self.current {
            self.interrupted = true;
            info!(from = ?previous, to = ?self.current, "Input route changed");
            return Some(Interruption::Began);
        }
        None
    }
}

impl Default for CpalRouteMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InterruptionMonitor for CpalRouteMonitor {
    async fn next_interruption(&mut self) -> Option<Interruption> {
        loop {
            let probed = match tokio::task::spawn_blocking(default_input_name).await {
                Ok(probed) => probed,
                Err(e) => {
                    debug!(error = %e, "Route probe task failed; monitor stopping");
                    return None;
                }
            };
            if let Some(interruption) = self.observe(probed) {
                return Some(interruption);
            }
            sleep(self.interval).await;
        }
    }
}
