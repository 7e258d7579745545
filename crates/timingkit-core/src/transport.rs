//! Transport capability traits.
//!
//! The concrete transport (queues, pub/sub, IPC) is a collaborator, not part
//! of this workspace. Components receive these capabilities at construction
//! time; there is no process-wide transport singleton, which is what lets
//! the estimator and controllers run against in-memory fakes in tests.

use crate::command::HwCommand;
use crate::sample::TimeSyncSample;
use std::time::Duration;

/// Errors surfaced by a transport implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The far side of the channel has gone away.
    #[error("transport connection closed")]
    Closed,
    /// A bounded push did not complete in time.
    #[error("transport push timed out after {0:?}")]
    Timeout(Duration),
}

/// Fire-and-forget sink for hardware commands.
///
/// Senders must be cheap to call from a controller's command path; delivery
/// acknowledgement is not part of the contract (readiness is confirmed via
/// the status-snapshot stream instead).
pub trait CommandSender: Send + Sync {
    /// Push one command toward the hardware-access layer.
    fn send_command(&self, command: HwCommand) -> Result<(), TransportError>;
}

/// Non-blocking source of time-sync samples.
pub trait TimeSyncReceiver: Send {
    /// Pop the next available sample, or `None` if nothing is queued.
    fn try_recv(&self) -> Option<TimeSyncSample>;
}
