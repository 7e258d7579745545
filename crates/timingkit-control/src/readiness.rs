//! Shared readiness state between snapshot handlers and the coordinator.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use tracing::debug;

/// One read of the readiness state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessObservation {
    /// Whether the entity currently satisfies its readiness predicate.
    pub ready: bool,
    /// How many status snapshots have been recorded so far.
    pub infos_received: u64,
    /// Status code from the most recent snapshot.
    pub state: u32,
}

/// Readiness signal for one hardware entity.
///
/// Written by the status-snapshot handler thread, read lock-free by the
/// coordinator's poll loop. `infos_received` only increases during a
/// coordination run; `ready` may flip in either direction. Transitions are
/// logged once per edge, not once per snapshot.
#[derive(Debug)]
pub struct DeviceReadiness {
    entity: String,
    ready: AtomicBool,
    infos_received: AtomicU64,
    last_state: AtomicU32,
}

impl DeviceReadiness {
    /// Fresh, not-ready state labelled with an entity description for logs.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ready: AtomicBool::new(false),
            infos_received: AtomicU64::new(0),
            last_state: AtomicU32::new(0),
        }
    }

    /// Record the outcome of one readiness predicate evaluation.
    pub fn record(&self, ready: bool, state: u32) {
        self.last_state.store(state, Ordering::Relaxed);
        let was_ready = self.ready.swap(ready, Ordering::AcqRel);
        if ready != was_ready {
            if ready {
                debug!(entity = %self.entity, state = format_args!("{state:#x}"), "became ready");
            } else {
                debug!(entity = %self.entity, state = format_args!("{state:#x}"), "no longer ready");
            }
        }
        self.infos_received.fetch_add(1, Ordering::AcqRel);
    }

    /// Snapshot the current state.
    pub fn observe(&self) -> ReadinessObservation {
        ReadinessObservation {
            ready: self.ready.load(Ordering::Acquire),
            infos_received: self.infos_received.load(Ordering::Acquire),
            state: self.last_state.load(Ordering::Relaxed),
        }
    }

    /// Entity description used in logs and errors.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Start a new coordination run, e.g. after a scrap.
    pub fn reset(&self) {
        self.ready.store(false, Ordering::Release);
        self.infos_received.store(0, Ordering::Release);
        self.last_state.store(0, Ordering::Relaxed);
    }
}
