//! Free-running estimator for systems without hardware time sync.

use std::sync::Arc;

use crate::source::TimestampSource;
use timingkit_core::{SystemClock, Timestamp, WallClock};

/// Derives the timestamp directly from the wall clock.
///
/// Used in test setups where no timing hardware exists: the "hardware"
/// timestamp is simply the wall clock scaled to the configured frequency.
/// Always valid, so the blocking waits release immediately.
pub struct SystemClockEstimator {
    clock_frequency_hz: u64,
    clock: Arc<dyn WallClock>,
}

impl SystemClockEstimator {
    /// Estimator against the real system clock.
    pub fn new(clock_frequency_hz: u64) -> Self {
        Self::with_clock(clock_frequency_hz, Arc::new(SystemClock))
    }

    /// Estimator with an injected wall clock.
    pub fn with_clock(clock_frequency_hz: u64, clock: Arc<dyn WallClock>) -> Self {
        Self {
            clock_frequency_hz,
            clock,
        }
    }
}

impl TimestampSource for SystemClockEstimator {
    fn get_timestamp_estimate(&self) -> Timestamp {
        let now_us = self.clock.now_micros();
        (u128::from(now_us) * u128::from(self.clock_frequency_hz) / 1_000_000) as u64
    }
}
