//! Shutdown signal handling for daemon mode

use std::fmt;
use std::io;

use tokio::signal::unix::{signal, Signal, SignalKind};

/// Signal that ended the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownKind {
    /// SIGINT (Ctrl+C)
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl fmt::Display for ShutdownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Waits for SIGINT or SIGTERM.
///
/// Handlers are installed on construction so a signal arriving before
/// `recv` is awaited is not lost.
pub struct ShutdownSignal {
    sigint: Signal,
    sigterm: Signal,
}

impl ShutdownSignal {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the next shutdown signal
    pub async fn recv(&mut self) -> ShutdownKind {
        tokio::select! {
            _ = self.sigint.recv() => ShutdownKind::Interrupt,
            _ = self.sigterm.recv() => ShutdownKind::Terminate,
        }
    }
}
