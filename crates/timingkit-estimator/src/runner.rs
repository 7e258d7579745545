//! Receiver-driven estimator thread.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::estimator::TimestampEstimator;
use timingkit_core::TimeSyncReceiver;

/// Poll cadence of the receive loop.
const RECEIVE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Owns a thread that feeds a [`TimestampEstimator`] from a
/// [`TimeSyncReceiver`].
///
/// On start it drains whatever is already queued: sample senders are
/// stopped after their consumers, so leftovers from a previous run may
/// still be in flight. Dropping current-run samples in that sweep is
/// harmless, it only delays the first estimate slightly. The estimator is
/// then reset so the run starts from an invalid estimate.
pub struct EstimatorRunner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EstimatorRunner {
    /// Spawn the receive loop.
    pub fn spawn(
        estimator: Arc<TimestampEstimator>,
        receiver: Box<dyn TimeSyncReceiver>,
    ) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("ts-estimator".into())
            .spawn(move || receive_loop(&estimator, receiver.as_ref(), &flag))?;
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Shared flag consumers can pass to the blocking waits so they release
    /// when the runner stops.
    pub fn run_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Stop the receive loop and join the thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EstimatorRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn receive_loop(
    estimator: &TimestampEstimator,
    receiver: &dyn TimeSyncReceiver,
    running: &AtomicBool,
) {
    let mut discarded = 0u64;
    while receiver.try_recv().is_some() {
        discarded += 1;
    }
    if discarded > 0 {
        debug!(discarded, "drained leftover time sync samples at start");
    }
    estimator.reset();

    while running.load(Ordering::Relaxed) {
        while let Some(sample) = receiver.try_recv() {
            estimator.add_sample(sample);
        }
        thread::sleep(RECEIVE_POLL_INTERVAL);
    }

    // Drain on the way out so a slow sender cannot back up the transport.
    while receiver.try_recv().is_some() {}
}
