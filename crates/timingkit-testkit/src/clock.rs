//! Manually driven wall clock.

use std::sync::atomic::{AtomicU64, Ordering};

use timingkit_core::WallClock;

/// A wall clock that only moves when the test says so.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    /// Clock starting at `micros` microseconds since the epoch.
    pub fn starting_at(micros: u64) -> Self {
        Self {
            micros: AtomicU64::new(micros),
        }
    }

    /// Advance the clock.
    pub fn advance_micros(&self, micros: u64) {
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }

    /// Jump to an absolute time.
    pub fn set_micros(&self, micros: u64) {
        self.micros.store(micros, Ordering::SeqCst);
    }
}

impl WallClock for ManualClock {
    fn now_micros(&self) -> u64 {
        self.micros.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_on_demand() {
        let clock = ManualClock::starting_at(1_000);
        assert_eq!(clock.now_micros(), 1_000);
        clock.advance_micros(500);
        assert_eq!(clock.now_micros(), 1_500);
        clock.set_micros(10);
        assert_eq!(clock.now_micros(), 10);
    }
}
