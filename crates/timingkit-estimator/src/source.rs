//! Consumer-facing timestamp interface with cancellable blocking waits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use timingkit_core::{Timestamp, INVALID_TIMESTAMP};

/// Poll cadence of the blocking waits. Cancellation latency is bounded by
/// one tick.
pub const ESTIMATE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Why a blocking wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// The wait condition was met.
    Finished,
    /// The shared run flag went false first.
    Interrupted,
}

/// Anything that can answer "what is the current hardware timestamp".
///
/// The waits are sleep-poll loops on the calling thread; cancellation is
/// cooperative through `running`, checked once per tick. If no sample ever
/// arrives the waits never finish on their own, so callers must always pair
/// them with their shutdown flag.
pub trait TimestampSource {
    /// Current estimate, [`INVALID_TIMESTAMP`] until one becomes available.
    fn get_timestamp_estimate(&self) -> Timestamp;

    /// Block until the estimate is valid or `running` goes false.
    fn wait_for_valid_timestamp(&self, running: &AtomicBool) -> WaitStatus {
        poll_until(running, || self.get_timestamp_estimate() != INVALID_TIMESTAMP)
    }

    /// Block until the estimate reaches `target` or `running` goes false.
    fn wait_for_timestamp(&self, target: Timestamp, running: &AtomicBool) -> WaitStatus {
        poll_until(running, || {
            let estimate = self.get_timestamp_estimate();
            estimate != INVALID_TIMESTAMP && estimate >= target
        })
    }
}

fn poll_until(running: &AtomicBool, condition: impl Fn() -> bool) -> WaitStatus {
    loop {
        if condition() {
            return WaitStatus::Finished;
        }
        if !running.load(Ordering::Relaxed) {
            return WaitStatus::Interrupted;
        }
        thread::sleep(ESTIMATE_POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Timestamp);

    impl TimestampSource for Fixed {
        fn get_timestamp_estimate(&self) -> Timestamp {
            self.0
        }
    }

    #[test]
    fn wait_finishes_immediately_when_already_valid() {
        let source = Fixed(42);
        let running = AtomicBool::new(true);
        assert_eq!(
            source.wait_for_valid_timestamp(&running),
            WaitStatus::Finished
        );
        assert_eq!(source.wait_for_timestamp(40, &running), WaitStatus::Finished);
    }

    #[test]
    fn wait_prefers_finished_over_interrupted() {
        // Condition already true and flag already false: the condition wins.
        let source = Fixed(42);
        let running = AtomicBool::new(false);
        assert_eq!(
            source.wait_for_valid_timestamp(&running),
            WaitStatus::Finished
        );
    }

    #[test]
    fn wait_interrupts_when_flag_cleared() {
        let source = Fixed(INVALID_TIMESTAMP);
        let running = AtomicBool::new(false);
        assert_eq!(
            source.wait_for_valid_timestamp(&running),
            WaitStatus::Interrupted
        );
        assert_eq!(
            source.wait_for_timestamp(100, &running),
            WaitStatus::Interrupted
        );
    }
}
