//! Blocking-wait and runner behavior against the in-memory fakes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use timingkit_core::{TimeSyncSample, INVALID_TIMESTAMP};
use timingkit_estimator::{EstimatorRunner, TimestampEstimator, TimestampSource, WaitStatus};
use timingkit_testkit::{init_tracing, time_sync_channel, ManualClock};

const FREQ_50_MHZ: u64 = 50_000_000;

#[test]
fn wait_for_valid_releases_within_one_tick_of_cancellation() {
    init_tracing();
    let estimator = Arc::new(TimestampEstimator::new(FREQ_50_MHZ));
    let running = Arc::new(AtomicBool::new(true));

    let waiter = {
        let estimator = Arc::clone(&estimator);
        let running = Arc::clone(&running);
        thread::spawn(move || estimator.wait_for_valid_timestamp(&running))
    };

    // No sample will ever arrive; only cancellation can release the wait.
    thread::sleep(Duration::from_millis(30));
    let cancelled_at = Instant::now();
    running.store(false, Ordering::Relaxed);

    let status = waiter.join().expect("waiter thread");
    assert_eq!(status, WaitStatus::Interrupted);
    // One poll tick plus scheduling slack.
    assert!(cancelled_at.elapsed() < Duration::from_millis(100));
    assert_eq!(estimator.get_timestamp_estimate(), INVALID_TIMESTAMP);
}

#[test]
fn wait_for_timestamp_finishes_when_estimate_crosses_target() {
    init_tracing();
    let clock = Arc::new(ManualClock::starting_at(1_000_000));
    let estimator = Arc::new(TimestampEstimator::with_clock(FREQ_50_MHZ, clock.clone()));
    let running = Arc::new(AtomicBool::new(true));

    // 10 ms after capture: 1000 + 10_000 us * 50 ticks/us = 501_000 ticks.
    estimator.add_sample(TimeSyncSample::new(1000, 990_000, 1));
    assert!(estimator.get_timestamp_estimate() < 2_000_000);

    let waiter = {
        let estimator = Arc::clone(&estimator);
        let running = Arc::clone(&running);
        thread::spawn(move || estimator.wait_for_timestamp(2_000_000, &running))
    };

    thread::sleep(Duration::from_millis(20));
    // Advance the wall clock far enough for the projection to pass the
    // target, then deliver a fresh look at the same sample.
    clock.advance_micros(50_000);
    estimator.add_sample(TimeSyncSample::new(1000, 990_000, 1));

    assert_eq!(waiter.join().expect("waiter thread"), WaitStatus::Finished);
    assert!(estimator.get_timestamp_estimate() >= 2_000_000);
}

#[test]
fn runner_feeds_estimator_and_discards_stale_queue() {
    init_tracing();
    let clock = Arc::new(ManualClock::starting_at(5_000_000));
    let estimator = Arc::new(TimestampEstimator::with_clock(FREQ_50_MHZ, clock.clone()));
    let (feeder, receiver) = time_sync_channel();

    // Already queued before the runner starts; must be swept, not applied.
    feeder.feed(TimeSyncSample::new(999_999_999, 4_000_000, 1));

    let runner = EstimatorRunner::spawn(Arc::clone(&estimator), Box::new(receiver))
        .expect("spawn runner");
    let running = runner.run_flag();

    // The start-up drain races the first feed, so keep feeding until the
    // estimate shows up.
    let stop_feeding = Arc::new(AtomicBool::new(false));
    let feeding = {
        let stop = Arc::clone(&stop_feeding);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                feeder.feed(TimeSyncSample::new(1000, 4_990_000, 1));
                thread::sleep(Duration::from_millis(5));
            }
        })
    };

    let status = estimator.wait_for_valid_timestamp(&running);
    stop_feeding.store(true, Ordering::Relaxed);
    feeding.join().expect("feeder thread");
    assert_eq!(status, WaitStatus::Finished);

    let estimate = estimator.get_timestamp_estimate();
    assert_ne!(estimate, INVALID_TIMESTAMP);
    // The stale pre-start sample must not have poisoned the estimate.
    assert!(estimate < 999_999_999);

    runner.stop();
    assert!(!running.load(Ordering::Relaxed));
}

#[test]
fn runner_stop_releases_waiters() {
    init_tracing();
    let estimator = Arc::new(TimestampEstimator::new(FREQ_50_MHZ));
    let (_feeder, receiver) = time_sync_channel();

    let runner = EstimatorRunner::spawn(Arc::clone(&estimator), Box::new(receiver))
        .expect("spawn runner");
    let running = runner.run_flag();

    let waiter = {
        let estimator = Arc::clone(&estimator);
        let running = Arc::clone(&running);
        thread::spawn(move || estimator.wait_for_timestamp(u64::MAX - 1, &running))
    };

    thread::sleep(Duration::from_millis(20));
    runner.stop();

    assert_eq!(
        waiter.join().expect("waiter thread"),
        WaitStatus::Interrupted
    );
}
