//! The configure-or-recover engine.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::readiness::ReadinessObservation;

/// Default cadence at which the coordinator re-reads the readiness signal.
pub const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Default bound on one readiness window.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Knobs for one coordination run.
#[derive(Debug, Clone)]
pub struct CoordinationPolicy {
    /// When true, give an already-configured entity one readiness window
    /// before disturbing it with fresh configure commands.
    pub recovery_enabled: bool,
    /// Bound on each readiness window.
    pub ready_timeout: Duration,
    /// Poll cadence.
    pub poll_interval: Duration,
}

impl Default for CoordinationPolicy {
    fn default() -> Self {
        Self {
            recovery_enabled: true,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            poll_interval: READINESS_POLL_INTERVAL,
        }
    }
}

/// How a successful coordination run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinationOutcome {
    /// The entity was already correctly configured; no commands were sent.
    Recovered,
    /// Configure commands were sent and the entity then became ready.
    Configured,
}

/// Reconcile "already configured from a previous session?" against "must be
/// ready within a deadline".
///
/// Blocks the calling thread. With recovery enabled, the entity first gets
/// one readiness window untouched; only if that window expires are the
/// configure commands sent, once, with a fresh window. With recovery
/// disabled, `configure` runs immediately before the first poll. In either
/// case `configure` is invoked at most once, and an entity that is still
/// not ready when its post-configure window expires produces the
/// caller-supplied fatal error carrying the last observed status code.
///
/// Success requires both the readiness predicate and at least one received
/// status snapshot, so a silent status stream cannot be mistaken for a
/// ready device.
pub fn configure_or_recover<E>(
    entity: &str,
    policy: &CoordinationPolicy,
    mut configure: impl FnMut(),
    probe: impl Fn() -> ReadinessObservation,
    on_timeout: impl FnOnce(u32) -> E,
) -> Result<CoordinationOutcome, E> {
    let mut configured = false;

    if !policy.recovery_enabled {
        debug!(entity, "state recovery not enabled; sending configure commands");
        configure();
        configured = true;
    }

    let mut window_started = Instant::now();
    let mut last_logged_ready: Option<bool> = None;

    loop {
        let observation = probe();

        if last_logged_ready != Some(observation.ready) {
            debug!(
                entity,
                ready = observation.ready,
                infos_received = observation.infos_received,
                state = format_args!("{:#x}", observation.state),
                "readiness changed"
            );
            last_logged_ready = Some(observation.ready);
        }

        if observation.ready && observation.infos_received > 0 {
            if !configured {
                debug!(entity, "hardware state recovered without reconfiguration");
                return Ok(CoordinationOutcome::Recovered);
            }
            return Ok(CoordinationOutcome::Configured);
        }

        if window_started.elapsed() > policy.ready_timeout {
            if configured {
                return Err(on_timeout(observation.state));
            }
            debug!(entity, "state not recovered; sending configure commands");
            configure();
            configured = true;
            window_started = Instant::now();
        }

        trace!(
            entity,
            waited_ms = window_started.elapsed().as_millis() as u64,
            "waiting for device readiness"
        );
        thread::sleep(policy.poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readiness::DeviceReadiness;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_policy(recovery_enabled: bool) -> CoordinationPolicy {
        CoordinationPolicy {
            recovery_enabled,
            ready_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(5),
        }
    }

    #[test]
    fn recovery_short_circuits_without_configuring() {
        let readiness = DeviceReadiness::new("test entity");
        readiness.record(true, 0x8);
        let configures = AtomicUsize::new(0);

        let outcome = configure_or_recover(
            "test entity",
            &fast_policy(true),
            || {
                configures.fetch_add(1, Ordering::SeqCst);
            },
            || readiness.observe(),
            |state| state,
        );

        assert_eq!(outcome, Ok(CoordinationOutcome::Recovered));
        assert_eq!(configures.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ready_flag_alone_is_not_enough() {
        // ready=true but zero snapshots received must not count as success.
        let configures = AtomicUsize::new(0);
        let result = configure_or_recover(
            "test entity",
            &fast_policy(true),
            || {
                configures.fetch_add(1, Ordering::SeqCst);
            },
            || ReadinessObservation {
                ready: true,
                infos_received: 0,
                state: 0x8,
            },
            |state| state,
        );
        assert_eq!(result, Err(0x8));
        assert_eq!(configures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn configures_exactly_once_then_fails_with_last_state() {
        let configures = AtomicUsize::new(0);
        let started = Instant::now();

        let result: Result<CoordinationOutcome, u32> = configure_or_recover(
            "test entity",
            &fast_policy(true),
            || {
                configures.fetch_add(1, Ordering::SeqCst);
            },
            || ReadinessObservation {
                ready: false,
                infos_received: 4,
                state: 0x2,
            },
            |state| state,
        );

        assert_eq!(result, Err(0x2));
        assert_eq!(configures.load(Ordering::SeqCst), 1);
        // One recovery window plus one post-configure window.
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn immediate_mode_configures_before_first_poll() {
        let readiness = DeviceReadiness::new("test entity");
        readiness.record(true, 0x8);
        let configures = AtomicUsize::new(0);

        let outcome = configure_or_recover(
            "test entity",
            &fast_policy(false),
            || {
                configures.fetch_add(1, Ordering::SeqCst);
            },
            || readiness.observe(),
            |state| state,
        );

        assert_eq!(outcome, Ok(CoordinationOutcome::Configured));
        assert_eq!(configures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn becomes_ready_after_fallback_configure() {
        let readiness = Arc::new(DeviceReadiness::new("test entity"));
        let configures = Arc::new(AtomicUsize::new(0));

        let outcome = {
            let readiness_in_configure = Arc::clone(&readiness);
            let configures = Arc::clone(&configures);
            configure_or_recover(
                "test entity",
                &fast_policy(true),
                move || {
                    configures.fetch_add(1, Ordering::SeqCst);
                    // Simulate the device reacting to the configure commands.
                    readiness_in_configure.record(true, 0x8);
                },
                || readiness.observe(),
                |state| state,
            )
        };

        assert_eq!(outcome, Ok(CoordinationOutcome::Configured));
        assert_eq!(configures.load(Ordering::SeqCst), 1);
    }
}
