//! Timestamp estimation from asynchronous time-sync samples.
//!
//! A remote timing master stamps data with its own clock. Components on the
//! control side periodically receive [`TimeSyncSample`]s correlating that
//! clock with local wall-clock time, and from those this crate publishes a
//! single, monotonically non-decreasing estimate of "now" in hardware clock
//! ticks.
//!
//! Three pieces:
//! - [`TimestampEstimator`] turns samples into the published estimate
//!   (multi-producer writes, lock-free reads);
//! - [`TimestampSource`] is the consumer-facing trait: a lock-free read plus
//!   blocking, cancellable waits for "estimate valid" and "estimate reached
//!   a target";
//! - [`EstimatorRunner`] drives an estimator from a
//!   [`TimeSyncReceiver`](timingkit_core::TimeSyncReceiver) on its own
//!   thread.
//!
//! [`SystemClockEstimator`] is the degenerate variant for setups without a
//! hardware timing system: it derives the estimate directly from the wall
//! clock and the configured frequency.
//!
//! [`TimeSyncSample`]: timingkit_core::TimeSyncSample

#![forbid(unsafe_code)]

pub mod estimator;
pub mod runner;
pub mod source;
pub mod system_clock;

pub use estimator::TimestampEstimator;
pub use runner::EstimatorRunner;
pub use source::{TimestampSource, WaitStatus, ESTIMATE_POLL_INTERVAL};
pub use system_clock::SystemClockEstimator;
