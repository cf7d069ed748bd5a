//! Interruption source port interface

use async_trait::async_trait;

/// Asynchronous audio interruption notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// Another party claimed the input (incoming call, device removed)
    Began,
    /// The interruption is over
    Ended { should_resume: bool },
}

/// Port for observing interruptions of the audio input
#[async_trait]
pub trait InterruptionMonitor: Send {
    /// Wait for the next interruption. `None` means the monitor has stopped.
    async fn next_interruption(&mut self) -> Option<Interruption>;
}
