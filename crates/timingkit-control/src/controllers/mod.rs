//! Hardware-role controllers.
//!
//! One controller per timing-network role. Each owns its command builders,
//! its readiness predicate and its share of the coordination policy; the
//! actual configure/poll/retry loop is the shared engine in
//! [`crate::coordinator`].

pub mod endpoint;
pub mod fanout;
pub mod hsi;
pub mod master;
pub mod partition;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::coordinator::{configure_or_recover, CoordinationOutcome, CoordinationPolicy};
use crate::counters::CommandCounters;
use crate::error::{ControlError, Result};
use crate::readiness::DeviceReadiness;
use timingkit_core::{CommandSender, HwCommand};

/// Serde defaults shared by the controller configs.
pub(crate) mod defaults {
    pub(crate) fn recovery_enabled() -> bool {
        true
    }

    pub(crate) fn ready_timeout_ms() -> u64 {
        30_000
    }

    pub(crate) fn poll_interval_ms() -> u64 {
        250
    }
}

/// State every controller carries: target device, command transport,
/// readiness signal, sent-command counters and coordination policy.
pub(crate) struct ControllerCore {
    device: String,
    sender: Arc<dyn CommandSender>,
    readiness: DeviceReadiness,
    counters: Arc<CommandCounters>,
    policy: CoordinationPolicy,
}

impl ControllerCore {
    pub(crate) fn new(
        entity: &str,
        device: &str,
        sender: Arc<dyn CommandSender>,
        policy: CoordinationPolicy,
        command_ids: &'static [&'static str],
    ) -> Result<Self> {
        if device.is_empty() {
            return Err(ControlError::EmptyDeviceName);
        }
        Ok(Self {
            device: device.to_owned(),
            sender,
            readiness: DeviceReadiness::new(entity),
            counters: Arc::new(CommandCounters::new(command_ids)),
            policy,
        })
    }

    pub(crate) fn readiness(&self) -> &DeviceReadiness {
        &self.readiness
    }

    pub(crate) fn counters(&self) -> &Arc<CommandCounters> {
        &self.counters
    }

    pub(crate) fn sender(&self) -> &Arc<dyn CommandSender> {
        &self.sender
    }

    /// Push one command. A transport hiccup is logged and swallowed; the
    /// coordinator confirms the effect through the readiness signal, not
    /// through delivery acknowledgement.
    pub(crate) fn send(&self, id: &str, payload: serde_json::Value) {
        let command = HwCommand::with_payload(id, &self.device, payload);
        debug!(device = %self.device, id, "sending hardware command");
        if let Err(error) = self.sender.send_command(command) {
            warn!(device = %self.device, id, %error, "failed to push hardware command");
        }
        self.counters.increment(id);
    }

    /// Run the configure-or-recover engine against this controller's
    /// readiness signal.
    pub(crate) fn coordinate(
        &self,
        configure: impl FnMut(),
        make_error: impl FnOnce(u32) -> ControlError,
    ) -> Result<CoordinationOutcome> {
        configure_or_recover(
            self.readiness.entity(),
            &self.policy,
            configure,
            || self.readiness.observe(),
            make_error,
        )
    }
}
