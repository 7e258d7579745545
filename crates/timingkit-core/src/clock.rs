//! Wall-clock abstraction.
//!
//! The estimator projects hardware timestamps forward from the wall-clock
//! time at which a sample was captured, so it needs "now" in microseconds.
//! Production code uses [`SystemClock`]; tests inject a manually driven
//! clock so extrapolation arithmetic can be checked deterministically.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time in microseconds since the Unix epoch.
pub trait WallClock: Send + Sync {
    /// Current wall-clock time in microseconds since the Unix epoch.
    fn now_micros(&self) -> u64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_micros(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0)
    }
}
