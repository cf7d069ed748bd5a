//! Recording session state machine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::output::OutputTarget;
use crate::domain::events::PendingStart;

/// Recorder states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Paused,
}

impl RecordingState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordingState {
    type Err = UnknownRecordingState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "recording" => Ok(Self::Recording),
            "paused" => Ok(Self::Paused),
            _ => Err(UnknownRecordingState {
                input: s.to_string(),
            }),
        }
    }
}

/// Error when parsing a state name
#[derive(Debug, Clone, Error)]
#[error("Unknown recording state: \"{input}\"")]
pub struct UnknownRecordingState {
    pub input: String,
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: RecordingState,
    pub action: String,
}

/// What is left of a session once it has been closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedSession {
    pub output: OutputTarget,
    pub id: Option<String>,
    pub event_name: Option<String>,
    /// Whether the session was paused when it was closed
    pub was_paused: bool,
}

/// Recording session entity.
/// Owns the state and the per-attempt bookkeeping (output file, caller id,
/// event name) from start until stop.
///
/// State machine:
///   IDLE -> RECORDING (begin)
///   RECORDING -> PAUSED (pause, interrupt)
///   PAUSED -> RECORDING (resume)
///   RECORDING | PAUSED -> IDLE (finish, reset)
#[derive(Debug, Default)]
pub struct RecordingSession {
    state: RecordingState,
    output: Option<OutputTarget>,
    pending_id: Option<String>,
    pending_event_name: Option<String>,
    resume_after_interruption: bool,
}

impl RecordingSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RecordingState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    pub fn is_paused(&self) -> bool {
        self.state == RecordingState::Paused
    }

    /// Output file of the active session, if any
    pub fn output(&self) -> Option<&OutputTarget> {
        self.output.as_ref()
    }

    /// Caller id of the active session, if any
    pub fn pending_id(&self) -> Option<&str> {
        self.pending_id.as_deref()
    }

    /// Whether an interruption paused an actively recording session
    pub fn resume_after_interruption(&self) -> bool {
        self.resume_after_interruption
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }

    /// Transition from IDLE to RECORDING
    pub fn begin(
        &mut self,
        output: OutputTarget,
        pending: PendingStart,
    ) -> Result<(), InvalidStateTransition> {
        if self.state != RecordingState::Idle {
            return Err(self.invalid("start recording"));
        }
        self.state = RecordingState::Recording;
        self.output = Some(output);
        self.pending_id = pending.id;
        self.pending_event_name = pending.event;
        self.resume_after_interruption = false;
        Ok(())
    }

    /// Transition from RECORDING to PAUSED (user request)
    pub fn pause(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != RecordingState::Recording {
            return Err(self.invalid("pause recording"));
        }
        self.state = RecordingState::Paused;
        self.resume_after_interruption = false;
        Ok(())
    }

    /// Transition from PAUSED to RECORDING
    pub fn resume(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != RecordingState::Paused {
            return Err(self.invalid("resume recording"));
        }
        self.state = RecordingState::Recording;
        self.resume_after_interruption = false;
        Ok(())
    }

    /// Record an interruption.
    ///
    /// From RECORDING this pauses the session and arms auto-resume, returning
    /// `true`. From PAUSED the state is kept and auto-resume is left as it was
    /// (a user pause never arms it), returning `false`.
    pub fn interrupt(&mut self) -> Result<bool, InvalidStateTransition> {
        match self.state {
            RecordingState::Recording => {
                self.state = RecordingState::Paused;
                self.resume_after_interruption = true;
                Ok(true)
            }
            RecordingState::Paused => Ok(false),
            RecordingState::Idle => Err(self.invalid("interrupt recording")),
        }
    }

    /// Forget a pending auto-resume (interruption ended without resuming)
    pub fn disarm_resume(&mut self) {
        self.resume_after_interruption = false;
    }

    /// Transition from RECORDING or PAUSED to IDLE, handing back the session data
    pub fn finish(&mut self) -> Result<ClosedSession, InvalidStateTransition> {
        if self.state == RecordingState::Idle {
            return Err(self.invalid("stop recording"));
        }
        let was_paused = self.state == RecordingState::Paused;
        let output = self.output.take().ok_or_else(|| self.invalid("stop recording"))?;
        self.state = RecordingState::Idle;
        self.resume_after_interruption = false;
        Ok(ClosedSession {
            output,
            id: self.pending_id.take(),
            event_name: self.pending_event_name.take(),
            was_paused,
        })
    }

    /// Force the session back to IDLE, returning the output of the dropped session
    pub fn reset(&mut self) -> Option<OutputTarget> {
        self.state = RecordingState::Idle;
        self.pending_id = None;
        self.pending_event_name = None;
        self.resume_after_interruption = false;
        self.output.take()
    }
}
