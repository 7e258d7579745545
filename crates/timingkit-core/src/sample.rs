//! Time-sync sample message shape and timestamp conventions.

use serde::{Deserialize, Serialize};

/// A timestamp expressed in hardware clock ticks.
pub type Timestamp = u64;

/// Sentinel meaning "no valid timestamp". Estimates start here and return
/// here only on an explicit reset.
pub const INVALID_TIMESTAMP: Timestamp = u64::MAX;

/// A single clock-correlation sample from a remote sender.
///
/// Correlates a hardware clock tick count (`daq_time`) with the wall-clock
/// time at which the sender captured it (`system_time`, microseconds since
/// the Unix epoch). Samples are immutable once received; delivery order is
/// not guaranteed and duplicates are possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSyncSample {
    /// Hardware clock tick count at capture.
    pub daq_time: Timestamp,
    /// Wall-clock capture time, microseconds since the Unix epoch.
    pub system_time: u64,
    /// Run during which the sample was captured.
    pub run_number: u32,
    /// Per-sender sequence number.
    pub sequence_number: u32,
    /// Identifier of the sending process.
    pub source_id: u32,
}

impl TimeSyncSample {
    /// Build a sample for `run_number` with zeroed sequence/source fields.
    pub fn new(daq_time: Timestamp, system_time: u64, run_number: u32) -> Self {
        Self {
            daq_time,
            system_time,
            run_number,
            sequence_number: 0,
            source_id: 0,
        }
    }
}
