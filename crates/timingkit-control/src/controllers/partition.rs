//! Timing partition controller.
//!
//! A partition is a slice of the master's trigger fabric. Unlike the
//! device controllers it has a run lifecycle of its own: start and stop
//! open and close the trigger gate, pause and resume mask triggers without
//! tearing the partition down.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{defaults, ControllerCore};
use crate::commands::{PartitionCmdPayload, PartitionConfigureCmdPayload};
use crate::coordinator::{CoordinationOutcome, CoordinationPolicy};
use crate::error::{ControlError, Result};
use crate::predicates;
use crate::readiness::DeviceReadiness;
use crate::status::PartitionStatus;
use timingkit_core::CommandSender;

/// Command ids a partition controller can send.
pub const PARTITION_COMMANDS: &[&str] = &[
    "partition_configure",
    "partition_enable",
    "partition_disable",
    "partition_start",
    "partition_stop",
    "partition_enable_triggers",
    "partition_disable_triggers",
    "partition_print_status",
];

/// Partition controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Master device hosting the partition.
    pub device: String,
    /// Partition index on that device.
    #[serde(default)]
    pub partition_id: u32,
    /// Trigger mask to apply.
    pub trigger_mask: u32,
    /// Whether spill-gate rate control is enabled.
    #[serde(default)]
    pub rate_control_enabled: bool,
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

impl PartitionConfig {
    fn policy(&self) -> CoordinationPolicy {
        CoordinationPolicy {
            recovery_enabled: self.hardware_state_recovery_enabled,
            ready_timeout: Duration::from_millis(self.device_ready_timeout_ms),
            poll_interval: Duration::from_millis(self.readiness_poll_interval_ms),
        }
    }
}

/// Drives one timing partition.
pub struct PartitionController {
    config: PartitionConfig,
    core: ControllerCore,
}

impl PartitionController {
    /// Build a controller over an injected command transport.
    pub fn new(config: PartitionConfig, sender: Arc<dyn CommandSender>) -> Result<Self> {
        let core = ControllerCore::new(
            "timing partition",
            &config.device,
            sender,
            config.policy(),
            PARTITION_COMMANDS,
        )?;
        Ok(Self { config, core })
    }

    /// Configure and enable the partition, or recover its previous state,
    /// and wait for it to report enabled with the expected trigger mask.
    pub fn configure(&self) -> Result<CoordinationOutcome> {
        let outcome = self.core.coordinate(
            || self.send_configure_commands(),
            |state| ControlError::PartitionNotReady {
                device: self.config.device.clone(),
                state,
            },
        )?;
        info!(
            device = %self.config.device,
            partition = self.config.partition_id,
            ?outcome,
            "partition configure done"
        );
        Ok(outcome)
    }

    fn send_configure_commands(&self) {
        let payload = PartitionConfigureCmdPayload {
            partition_id: self.config.partition_id,
            trigger_mask: self.config.trigger_mask,
            rate_control_enabled: self.config.rate_control_enabled,
        };
        self.core
            .send("partition_configure", serde_json::json!(payload));
        self.send_plain("partition_enable");
    }

    fn send_plain(&self, id: &str) {
        let payload = PartitionCmdPayload {
            partition_id: self.config.partition_id,
        };
        self.core.send(id, serde_json::json!(payload));
    }

    /// Run start: zero the counters and open the trigger gate.
    pub fn start(&self) {
        self.core.counters().reset();
        self.send_plain("partition_start");
        self.send_plain("partition_enable_triggers");
    }

    /// Run stop: close the trigger gate and stop the partition.
    pub fn stop(&self) {
        self.send_plain("partition_disable_triggers");
        self.send_plain("partition_stop");
    }

    /// Mask triggers without stopping the partition.
    pub fn pause(&self) {
        self.send_plain("partition_disable_triggers");
    }

    /// Unmask triggers after a pause.
    pub fn resume(&self) {
        self.send_plain("partition_enable_triggers");
    }

    /// Disable the partition entirely.
    pub fn disable(&self) {
        self.send_plain("partition_disable");
    }

    /// Ask the device to log the partition status registers.
    pub fn print_status(&self) {
        self.send_plain("partition_print_status");
    }

    /// Feed one status snapshot from the monitoring stream.
    pub fn handle_device_info(&self, info: &serde_json::Value) -> Result<()> {
        let status: PartitionStatus = serde_json::from_value(info.clone())?;
        let (ready, flags) = predicates::partition_ready(&status, self.config.trigger_mask);
        self.core.readiness().record(ready, flags);
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

    fn test_config() -> PartitionConfig {
        PartitionConfig {
            device: "master0".into(),
            partition_id: 2,
            trigger_mask: 0xff,
            rate_control_enabled: false,
            hardware_state_recovery_enabled: true,
            device_ready_timeout_ms: 50,
            readiness_poll_interval_ms: 5,
        }
    }

    #[test]
    fn configure_sends_configure_then_enable() {
        let sender = Arc::new(RecordingCommandSender::new());
        let controller =
            PartitionController::new(test_config(), sender.clone()).expect("controller");

        controller
            .handle_device_info(&snapshots::partition_status(false, false, 0))
            .expect("parse");

        assert!(controller.configure().is_err());
        assert_eq!(
            sender.sent_ids(),
            vec!["partition_configure", "partition_enable"]
        );
        let configure = &sender.sent()[0];
        assert_eq!(configure.payload["partition_id"], 2);
        assert_eq!(configure.payload["trigger_mask"], 0xff);
    }

    #[test]
    fn ready_needs_matching_trigger_mask() {
        let sender = Arc::new(RecordingCommandSender::new());
        let controller = PartitionController::new(test_config(), sender).expect("controller");

        controller
            .handle_device_info(&snapshots::partition_status(true, false, 0x0f))
            .expect("parse");
        assert!(!controller.readiness().observe().ready);

        controller
            .handle_device_info(&snapshots::partition_status(true, false, 0xff))
            .expect("parse");
        assert!(controller.readiness().observe().ready);
    }

    #[test]
    fn run_lifecycle_command_order() {
        let sender = Arc::new(RecordingCommandSender::new());
        let controller =
            PartitionController::new(test_config(), sender.clone()).expect("controller");

        controller.start();
        controller.pause();
        controller.resume();
        controller.stop();

        assert_eq!(
            sender.sent_ids(),
            vec![
                "partition_start",
                "partition_enable_triggers",
                "partition_disable_triggers",
                "partition_enable_triggers",
                "partition_disable_triggers",
                "partition_stop",
            ]
        );
        assert_eq!(controller.command_counts()["partition_enable_triggers"], 2);
    }

    #[test]
    fn errored_partition_is_not_ready() {
        let sender = Arc::new(RecordingCommandSender::new());
        let controller =
            PartitionController::new(test_config(), sender.clone()).expect("controller");

        controller
            .handle_device_info(&snapshots::partition_status(true, true, 0xff))
            .expect("parse");

        let error = controller.configure().expect_err("should time out");
        assert!(matches!(error, ControlError::PartitionNotReady { .. }));
    }
}
