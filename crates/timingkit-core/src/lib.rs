//! Core data model for the timing coordination workspace.
//!
//! This crate holds the pieces shared by every other timingkit crate: the
//! time-sync sample and hardware-command message shapes, the capability
//! traits through which the rest of the workspace talks to the outside world
//! (command transport, sample delivery), and the wall-clock abstraction that
//! makes the time-dependent components testable.
//!
//! Nothing in here performs I/O. Concrete transports live behind
//! [`transport::CommandSender`] and [`transport::TimeSyncReceiver`] and are
//! injected at construction time by whoever owns an estimator or a
//! controller.

#![forbid(unsafe_code)]

pub mod clock;
pub mod command;
pub mod sample;
pub mod transport;

pub use clock::{SystemClock, WallClock};
pub use command::HwCommand;
pub use sample::{TimeSyncSample, Timestamp, INVALID_TIMESTAMP};
pub use transport::{CommandSender, TimeSyncReceiver, TransportError};
