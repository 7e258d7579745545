//! Sample-driven timestamp estimator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::source::TimestampSource;
use timingkit_core::{SystemClock, TimeSyncSample, Timestamp, WallClock, INVALID_TIMESTAMP};

/// A sample claiming to be captured more than this far in the future
/// triggers a clock-quality warning.
const EARLY_SAMPLE_SLACK_US: u64 = 10_000;

/// A sample older than this at publish time triggers a clock-quality
/// warning; it usually means host clocks have drifted apart.
const LATE_SAMPLE_THRESHOLD_US: u64 = 1_000_000;

/// Publishes a monotonic estimate of the remote hardware clock.
///
/// `add_sample` may be called from any number of threads; updates are
/// serialized on one internal lock. The published estimate is a single
/// atomic word read without any lock by arbitrarily many consumers.
///
/// The estimator keeps the sample with the largest `daq_time` seen so far
/// (not the most recently arrived one, so reordered delivery is harmless)
/// and on every accepted sample projects it forward by the wall-clock time
/// elapsed since its capture, assuming the device clock runs at a constant
/// configured frequency. The published value never moves backward.
pub struct TimestampEstimator {
    clock_frequency_hz: u64,
    run_number: Option<u32>,
    clock: Arc<dyn WallClock>,
    retained: Mutex<Option<TimeSyncSample>>,
    estimate: AtomicU64,
}

impl TimestampEstimator {
    /// Estimator against the real system clock, accepting samples from any
    /// run.
    pub fn new(clock_frequency_hz: u64) -> Self {
        Self::with_clock(clock_frequency_hz, Arc::new(SystemClock))
    }

    /// Estimator with an injected wall clock.
    pub fn with_clock(clock_frequency_hz: u64, clock: Arc<dyn WallClock>) -> Self {
        Self {
            clock_frequency_hz,
            run_number: None,
            clock,
            retained: Mutex::new(None),
            estimate: AtomicU64::new(INVALID_TIMESTAMP),
        }
    }

    /// Restrict the estimator to samples from `run_number`; samples from
    /// other runs are discarded.
    pub fn scoped_to_run(mut self, run_number: u32) -> Self {
        self.run_number = Some(run_number);
        self
    }

    /// The configured device clock frequency.
    pub fn clock_frequency_hz(&self) -> u64 {
        self.clock_frequency_hz
    }

    /// Accept one sample. Never blocks on I/O.
    pub fn add_sample(&self, sample: TimeSyncSample) {
        if let Some(run) = self.run_number {
            if sample.run_number != run {
                debug!(
                    expected_run = run,
                    sample_run = sample.run_number,
                    "discarding time sync sample from another run"
                );
                return;
            }
        }

        let mut retained = self.retained.lock();

        debug!(
            daq_time = sample.daq_time,
            system_time = sample.system_time,
            run = sample.run_number,
            seqno = sample.sequence_number,
            source = sample.source_id,
            estimate = self.estimate.load(Ordering::Acquire),
            "got time sync sample"
        );

        // Largest daq_time wins, irrespective of arrival order.
        let replace = retained
            .as_ref()
            .map_or(true, |kept| sample.daq_time > kept.daq_time);
        if replace {
            *retained = Some(sample);
        }

        let Some(current) = retained.as_ref() else {
            return;
        };

        let now = self.clock.now_micros();

        // Samples from another host can legitimately sit slightly in our
        // future; a large discrepancy means the host clocks disagree.
        if current.system_time.saturating_sub(now) > EARLY_SAMPLE_SLACK_US {
            warn!(
                ahead_us = current.system_time - now,
                "time sync sample from the future"
            );
        }

        if now <= current.system_time {
            // Nothing new to publish until our clock passes the capture time.
            return;
        }

        let delta_us = now - current.system_time;
        if delta_us > LATE_SAMPLE_THRESHOLD_US {
            warn!(behind_us = delta_us, "stale time sync sample");
        }

        // Project the sample forward by the ticks elapsed since capture.
        let advance =
            (u128::from(delta_us) * u128::from(self.clock_frequency_hz) / 1_000_000) as u64;
        let candidate = current.daq_time.saturating_add(advance);

        let published = self.estimate.load(Ordering::Acquire);
        if published == INVALID_TIMESTAMP || candidate >= published {
            self.estimate.store(candidate, Ordering::Release);
        } else {
            debug!(
                published,
                candidate, "not moving timestamp estimate backwards"
            );
        }
    }

    /// Drop the retained sample and return the estimate to invalid, e.g.
    /// between runs.
    pub fn reset(&self) {
        let mut retained = self.retained.lock();
        *retained = None;
        self.estimate.store(INVALID_TIMESTAMP, Ordering::Release);
    }

    /// The `daq_time` of the currently retained sample, if any.
    pub fn retained_daq_time(&self) -> Option<Timestamp> {
        self.retained.lock().as_ref().map(|s| s.daq_time)
    }
}

impl TimestampSource for TimestampEstimator {
    fn get_timestamp_estimate(&self) -> Timestamp {
        self.estimate.load(Ordering::Acquire)
    }
}
