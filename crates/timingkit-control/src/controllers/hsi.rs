//! Hardware signals interface (HSI) controller.
//!
//! The HSI samples external signals against the timing clock and emits
//! trigger words. It sits behind a timing endpoint of its own, so readiness
//! is that endpoint's state; the trigger configuration rides on top.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{defaults, ControllerCore};
use crate::commands::HsiConfigureCmdPayload;
use crate::coordinator::{CoordinationOutcome, CoordinationPolicy};
use crate::error::{ControlError, Result};
use crate::predicates;
use crate::readiness::DeviceReadiness;
use crate::status::HsiStatus;
use timingkit_core::CommandSender;

/// Command ids an HSI controller can send.
pub const HSI_COMMANDS: &[&str] = &[
    "hsi_reset",
    "endpoint_reset",
    "hsi_configure",
    "hsi_start",
    "hsi_stop",
    "hsi_print_status",
];

/// HSI controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsiConfig {
    /// Target device name.
    pub device: String,
    /// Signal mask for rising-edge triggers.
    #[serde(default)]
    pub rising_edge_mask: u32,
    /// Signal mask for falling-edge triggers.
    #[serde(default)]
    pub falling_edge_mask: u32,
    /// Signal mask inverting edge polarity.
    #[serde(default)]
    pub invert_edge_mask: u32,
    /// Which signal source feeds the HSI.
    #[serde(default)]
    pub data_source: u32,
    /// Emulated random trigger rate in Hz, when the source is emulated.
    #[serde(default)]
    pub random_rate: f64,
    /// Defer configure commands until a recovery window expires.
    #[serde(default = "defaults::recovery_enabled")]
    pub hardware_state_recovery_enabled: bool,
    /// Bound on each readiness window, in milliseconds.
    #[serde(default = "defaults::ready_timeout_ms")]
    pub device_ready_timeout_ms: u64,
    /// Readiness poll cadence, in milliseconds.
    #[serde(default = "defaults::poll_interval_ms")]
    pub readiness_poll_interval_ms: u64,
}

impl HsiConfig {
    fn policy(&self) -> CoordinationPolicy {
        CoordinationPolicy {
            recovery_enabled: self.hardware_state_recovery_enabled,
            ready_timeout: Duration::from_millis(self.device_ready_timeout_ms),
            poll_interval: Duration::from_millis(self.readiness_poll_interval_ms),
        }
    }

    fn trigger_payload(&self) -> HsiConfigureCmdPayload {
        HsiConfigureCmdPayload {
            rising_edge_mask: self.rising_edge_mask,
            falling_edge_mask: self.falling_edge_mask,
            invert_edge_mask: self.invert_edge_mask,
            data_source: self.data_source,
            random_rate: self.random_rate,
        }
    }
}

/// Drives one HSI device.
pub struct HsiController {
    config: HsiConfig,
    core: ControllerCore,
}

impl HsiController {
    /// Build a controller over an injected command transport.
    pub fn new(config: HsiConfig, sender: Arc<dyn CommandSender>) -> Result<Self> {
        let core = ControllerCore::new(
            "hardware signals interface",
            &config.device,
            sender,
            config.policy(),
            HSI_COMMANDS,
        )?;
        Ok(Self { config, core })
    }

    /// Configure the HSI, or recover its previous state, and wait for its
    /// timing endpoint to report ready.
    pub fn configure(&self) -> Result<CoordinationOutcome> {
        let outcome = self.core.coordinate(
            || self.send_configure_commands(),
            |state| ControlError::HsiNotReady {
                device: self.config.device.clone(),
                state,
            },
        )?;
        info!(device = %self.config.device, ?outcome, "hsi configure done");
        Ok(outcome)
    }

    fn send_configure_commands(&self) {
        self.core.send("hsi_reset", json!({}));
        self.core.send("endpoint_reset", json!({}));
        self.core
            .send("hsi_configure", serde_json::json!(self.config.trigger_payload()));
    }

    /// Run start: re-arm the trigger block and start emitting.
    pub fn start(&self) {
        self.core.counters().reset();
        self.core.send("hsi_reset", json!({}));
        self.core
            .send("hsi_configure", serde_json::json!(self.config.trigger_payload()));
        self.core.send("hsi_start", json!({}));
    }

    /// Run stop: stop emitting trigger words.
    pub fn stop(&self) {
        self.core.send("hsi_stop", json!({}));
    }

    /// Ask the device to log its HSI status registers.
    pub fn print_status(&self) {
        self.core.send("hsi_print_status", json!({}));
    }

    /// Feed one status snapshot from the monitoring stream.
    pub fn handle_device_info(&self, info: &serde_json::Value) -> Result<()> {
        let status: HsiStatus = serde_json::from_value(info.clone())?;
        let (ready, state) = predicates::hsi_ready(&status);
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

#[cfg(test)]
mod tests {
    use super::*;
    use timingkit_testkit::{snapshots, RecordingCommandSender};

    fn test_config() -> HsiConfig {
        HsiConfig {
            device: "hsi0".into(),
            rising_edge_mask: 0x1,
            falling_edge_mask: 0x0,
            invert_edge_mask: 0x0,
            data_source: 1,
            random_rate: 0.0,
            hardware_state_recovery_enabled: true,
            device_ready_timeout_ms: 50,
            readiness_poll_interval_ms: 5,
        }
    }

    #[test]
    fn configure_sequence_and_payload() {
        let sender = Arc::new(RecordingCommandSender::new());
        let controller = HsiController::new(test_config(), sender.clone()).expect("controller");

        controller
            .handle_device_info(&snapshots::hsi_status(0x1))
            .expect("parse");

        let error = controller.configure().expect_err("should time out");
        assert!(matches!(
            error,
            ControlError::HsiNotReady { state: 0x1, .. }
        ));
        assert_eq!(
            sender.sent_ids(),
            vec!["hsi_reset", "endpoint_reset", "hsi_configure"]
        );
        assert_eq!(sender.sent()[2].payload["rising_edge_mask"], 0x1);
    }

    #[test]
    fn recovers_when_endpoint_already_locked() {
        let sender = Arc::new(RecordingCommandSender::new());
        let controller = HsiController::new(test_config(), sender.clone()).expect("controller");

        controller
            .handle_device_info(&snapshots::hsi_status(0x8))
            .expect("parse");

        let outcome = controller.configure().expect("configure");
        assert_eq!(outcome, CoordinationOutcome::Recovered);
        assert!(sender.sent().is_empty());
    }

    #[test]
    fn start_rearms_before_starting() {
        let sender = Arc::new(RecordingCommandSender::new());
        let controller = HsiController::new(test_config(), sender.clone()).expect("controller");

        controller.start();
        controller.stop();

        assert_eq!(
            sender.sent_ids(),
            vec!["hsi_reset", "hsi_configure", "hsi_start", "hsi_stop"]
        );
    }
}
