//! Timing endpoint controller.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{defaults, ControllerCore};
use crate::commands::{EndpointCmdPayload, EndpointConfigureCmdPayload};
use crate::coordinator::{CoordinationOutcome, CoordinationPolicy};
use crate::error::{ControlError, Result};
use crate::predicates;
use crate::readiness::DeviceReadiness;
use crate::status::EndpointStatus;
use timingkit_core::CommandSender;

/// Command ids an endpoint controller can send.
pub const ENDPOINT_COMMANDS: &[&str] = &[
    "io_reset",
    "endpoint_enable",
    "endpoint_disable",
    "endpoint_reset",
    "endpoint_print_status",
];

/// Endpoint controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Target device name.
    pub device: String,
    /// Endpoint index on the device.
    #[serde(default)]
    pub endpoint_id: u32,
    /// Timing address to assign.
    pub address: u32,
    /// Partition the endpoint listens to.
    pub partition: u32,
    /// Defer configure commands until a recovery window expires.
    #[serde(default = "defaults::recovery_enabled")]
    pub hardware_state_recovery_enabled: bool,
    /// Bound on each readiness window, in milliseconds.
    #[serde(default = "defaults::ready_timeout_ms")]
    pub device_ready_timeout_ms: u64,
    /// Readiness poll cadence, in milliseconds.
    #[serde(default = "defaults::poll_interval_ms")]
    pub readiness_poll_interval_ms: u64,
    /// Settle time between the IO reset and the enable, in milliseconds.
    /// The board needs its clocks back before it will take an enable.
    #[serde(default = "default_io_reset_settle_ms")]
    pub io_reset_settle_ms: u64,
}

fn default_io_reset_settle_ms() -> u64 {
    7_000
}

impl EndpointConfig {
    fn policy(&self) -> CoordinationPolicy {
        CoordinationPolicy {
            recovery_enabled: self.hardware_state_recovery_enabled,
            ready_timeout: Duration::from_millis(self.device_ready_timeout_ms),
            poll_interval: Duration::from_millis(self.readiness_poll_interval_ms),
        }
    }
}

/// Drives one timing endpoint through configure-and-wait-for-ready.
pub struct EndpointController {
    config: EndpointConfig,
    core: ControllerCore,
}

impl EndpointController {
    /// Build a controller over an injected command transport.
    pub fn new(config: EndpointConfig, sender: Arc<dyn CommandSender>) -> Result<Self> {
        let core = ControllerCore::new(
            "timing endpoint",
            &config.device,
            sender,
            config.policy(),
            ENDPOINT_COMMANDS,
        )?;
        Ok(Self { config, core })
    }

    /// Configure the endpoint, or recover its previous state, and wait for
    /// it to report ready.
    pub fn configure(&self) -> Result<CoordinationOutcome> {
        let outcome = self.core.coordinate(
            || self.send_configure_commands(),
            |state| ControlError::EndpointNotReady {
                device: self.config.device.clone(),
                state,
            },
        )?;
        info!(device = %self.config.device, ?outcome, "endpoint configure done");
        Ok(outcome)
    }

    fn send_configure_commands(&self) {
        self.io_reset();
        if self.config.io_reset_settle_ms > 0 {
            thread::sleep(Duration::from_millis(self.config.io_reset_settle_ms));
        }
        self.enable();
    }

    /// Run start: zero the sent-command counters.
    pub fn start(&self) {
        self.core.counters().reset();
    }

    /// Reset the device IO block.
    pub fn io_reset(&self) {
        self.core.send("io_reset", json!({}));
    }

    /// Enable the endpoint with its configured link parameters.
    pub fn enable(&self) {
        let payload = EndpointConfigureCmdPayload {
            endpoint_id: self.config.endpoint_id,
            address: self.config.address,
            partition: self.config.partition,
        };
        self.core
            .send("endpoint_enable", serde_json::json!(payload));
    }

    /// Disable the endpoint.
    pub fn disable(&self) {
        let payload = EndpointCmdPayload {
            endpoint_id: self.config.endpoint_id,
        };
        self.core
            .send("endpoint_disable", serde_json::json!(payload));
    }

    /// Reset the endpoint state machine.
    pub fn reset(&self) {
        let payload = EndpointCmdPayload {
            endpoint_id: self.config.endpoint_id,
        };
        self.core.send("endpoint_reset", serde_json::json!(payload));
    }

    /// Ask the device to log its endpoint status registers.
    pub fn print_status(&self) {
        self.core.send("endpoint_print_status", json!({}));
    }

    /// Feed one status snapshot from the monitoring stream.
    pub fn handle_device_info(&self, info: &serde_json::Value) -> Result<()> {
        let status: EndpointStatus = serde_json::from_value(info.clone())?;
        let (ready, state) = predicates::endpoint_ready(&status);
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
