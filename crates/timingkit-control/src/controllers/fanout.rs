//! Timing fanout controller.
//!
//! A fanout relays the timing signal downstream and reports health through
//! its embedded endpoint block, so it is configured like an endpoint but
//! with a reset in place of an enable and a wider acceptable state band.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{defaults, ControllerCore};
use crate::coordinator::{CoordinationOutcome, CoordinationPolicy};
use crate::error::{ControlError, Result};
use crate::predicates;
use crate::readiness::DeviceReadiness;
use crate::status::FanoutStatus;
use timingkit_core::CommandSender;

/// Command ids a fanout controller can send.
pub const FANOUT_COMMANDS: &[&str] = &[
    "io_reset",
    "endpoint_reset",
    "endpoint_enable",
    "print_status",
];

/// Fanout controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Target device name.
    pub device: String,
    /// Defer configure commands until a recovery window expires.
    #[serde(default = "defaults::recovery_enabled")]
    pub hardware_state_recovery_enabled: bool,
    /// Bound on each readiness window, in milliseconds.
    #[serde(default = "defaults::ready_timeout_ms")]
    pub device_ready_timeout_ms: u64,
    /// Readiness poll cadence, in milliseconds.
    #[serde(default = "defaults::poll_interval_ms")]
    pub readiness_poll_interval_ms: u64,
    /// Settle time after the IO reset, in milliseconds. Fanout boards
    /// retrain every downstream SFP after a clock reset.
    #[serde(default = "default_io_reset_settle_ms")]
    pub io_reset_settle_ms: u64,
    /// Settle time after the endpoint reset, in milliseconds.
    #[serde(default = "default_endpoint_reset_settle_ms")]
    pub endpoint_reset_settle_ms: u64,
}

fn default_io_reset_settle_ms() -> u64 {
    15_000
}

fn default_endpoint_reset_settle_ms() -> u64 {
    1_000
}

impl FanoutConfig {
    fn policy(&self) -> CoordinationPolicy {
        CoordinationPolicy {
            recovery_enabled: self.hardware_state_recovery_enabled,
            ready_timeout: Duration::from_millis(self.device_ready_timeout_ms),
            poll_interval: Duration::from_millis(self.readiness_poll_interval_ms),
        }
    }
}

/// Drives one timing fanout through configure-and-wait-for-ready.
pub struct FanoutController {
    config: FanoutConfig,
    core: ControllerCore,
}

impl FanoutController {
    /// Build a controller over an injected command transport.
    pub fn new(config: FanoutConfig, sender: Arc<dyn CommandSender>) -> Result<Self> {
        let core = ControllerCore::new(
            "timing fanout",
            &config.device,
            sender,
            config.policy(),
            FANOUT_COMMANDS,
        )?;
        Ok(Self { config, core })
    }

    /// Configure the fanout, or recover its previous state, and wait for it
    /// to report a usable endpoint state.
    pub fn configure(&self) -> Result<CoordinationOutcome> {
        let outcome = self.core.coordinate(
            || self.send_configure_commands(),
            |state| ControlError::FanoutNotReady {
                device: self.config.device.clone(),
                state,
            },
        )?;
        info!(device = %self.config.device, ?outcome, "fanout configure done");
        Ok(outcome)
    }

    fn send_configure_commands(&self) {
        self.core.send("io_reset", json!({}));
        if self.config.io_reset_settle_ms > 0 {
            thread::sleep(Duration::from_millis(self.config.io_reset_settle_ms));
        }
        self.core.send("endpoint_reset", json!({}));
        if self.config.endpoint_reset_settle_ms > 0 {
            thread::sleep(Duration::from_millis(self.config.endpoint_reset_settle_ms));
        }
    }

    /// Run start: zero the sent-command counters.
    pub fn start(&self) {
        self.core.counters().reset();
    }

    /// Ask the device to log its status registers.
    pub fn print_status(&self) {
        self.core.send("print_status", json!({}));
    }

    /// Feed one status snapshot from the monitoring stream.
    pub fn handle_device_info(&self, info: &serde_json::Value) -> Result<()> {
        let status: FanoutStatus = serde_json::from_value(info.clone())?;
        let (ready, state) = predicates::fanout_ready(&status);
        self.core.readiness().record(ready, state);
        Ok(())
    }

    /// Readiness signal, for wiring into a snapshot poller.
    pub fn readiness(&self) -> &DeviceReadiness {
        self.core.readiness()
    }

    /// Sent-command counters keyed by command id.
    pub fn command_counts(&self) -> BTreeMap<&'static str, u64> {
        self.core.counters().snapshot()
    }
}
