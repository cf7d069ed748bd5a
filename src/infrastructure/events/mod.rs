//! Event sink adapters

mod broadcast;

pub use broadcast::{BroadcastEventSink, DEFAULT_EVENT_CAPACITY};
