//! Recording domain: session state machine and output description

pub mod format;
pub mod output;
pub mod state;

pub use format::{AudioCodec, AudioFormat, M4A_MIME_TYPE};
pub use output::OutputTarget;
pub use state::{
    ClosedSession, InvalidStateTransition, RecordingSession, RecordingState, UnknownRecordingState,
};
