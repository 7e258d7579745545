//! Hardware-readiness coordination for timing-network entities.
//!
//! Bringing a remote timing device under control has two competing goals:
//! do not disturb an entity that is still correctly configured from a
//! previous session, but force anything else into a known-good state within
//! a bounded time and fail loudly otherwise. The
//! [`coordinator::configure_or_recover`] engine implements that
//! configure/poll/retry loop once; every hardware-role controller in this
//! crate (endpoint, fanout, master, partition, hit-summary interface)
//! parameterizes it with its own configure action, readiness predicate and
//! fatal error kind.
//!
//! Readiness itself is driven from the outside: an external poller delivers
//! status snapshots to each controller's `handle_device_info`, which parses
//! the entity-kind-specific document, applies a pure predicate from
//! [`predicates`], and records the result in a shared [`DeviceReadiness`]
//! read by the coordinator's poll loop.

#![forbid(unsafe_code)]

pub mod commands;
pub mod controllers;
pub mod coordinator;
pub mod counters;
pub mod error;
pub mod predicates;
pub mod readiness;
pub mod status;

pub use controllers::endpoint::{EndpointConfig, EndpointController};
pub use controllers::fanout::{FanoutConfig, FanoutController};
pub use controllers::hsi::{HsiConfig, HsiController};
pub use controllers::master::{MasterConfig, MasterController};
pub use controllers::partition::{PartitionConfig, PartitionController};
pub use coordinator::{configure_or_recover, CoordinationOutcome, CoordinationPolicy};
pub use error::{ControlError, Result};
pub use readiness::{DeviceReadiness, ReadinessObservation};
