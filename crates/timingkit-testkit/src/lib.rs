//! Test doubles for the timing coordination workspace.
//!
//! Everything the estimator and the controllers need from the outside world
//! arrives through capability traits, so tests can run the real components
//! against the in-memory fakes here: a recording command sink, a
//! channel-backed sample stream, a manually driven wall clock, and status
//! snapshot builders for each hardware entity kind.

#![forbid(unsafe_code)]

pub mod clock;
pub mod logging;
pub mod snapshots;
pub mod transport;

pub use clock::ManualClock;
pub use logging::init_tracing;
pub use transport::{time_sync_channel, ChannelTimeSyncReceiver, RecordingCommandSender, TimeSyncFeeder};
