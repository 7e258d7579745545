//! Timing master controller.
//!
//! The master drives the clock and timestamp distribution for the whole
//! timing network. Besides configure-and-wait-for-ready it can run a
//! background round-trip scan over the endpoints it is told to watch.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use super::{defaults, ControllerCore};
use crate::commands::{EndpointLocation, EndpointScanPayload};
use crate::coordinator::{CoordinationOutcome, CoordinationPolicy};
use crate::error::{ControlError, Result};
use crate::predicates;
use crate::readiness::DeviceReadiness;
use crate::status::MasterStatus;
use timingkit_core::{CommandSender, HwCommand};

/// Command ids a master controller can send.
pub const MASTER_COMMANDS: &[&str] = &[
    "io_reset",
    "set_timestamp",
    "endpoint_scan",
    "print_status",
];

/// Master controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Target device name.
    pub device: String,
    /// Require all link health flags, not just a running timestamp.
    #[serde(default)]
    pub strict_ready_checks: bool,
    /// Period of the background endpoint scan, in milliseconds. Zero
    /// disables scanning.
    #[serde(default)]
    pub endpoint_scan_period_ms: u64,
    /// Endpoints covered by the background scan.
    #[serde(default)]
    pub monitored_endpoints: Vec<EndpointLocation>,
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

impl MasterConfig {
    fn policy(&self) -> CoordinationPolicy {
        CoordinationPolicy {
            recovery_enabled: self.hardware_state_recovery_enabled,
            ready_timeout: Duration::from_millis(self.device_ready_timeout_ms),
            poll_interval: Duration::from_millis(self.readiness_poll_interval_ms),
        }
    }
}

/// Drives the timing master.
pub struct MasterController {
    config: MasterConfig,
    core: ControllerCore,
    scan_running: Arc<AtomicBool>,
    scan_thread: parking_lot::Mutex<Option<thread::JoinHandle<()>>>,
}

impl MasterController {
    /// Build a controller over an injected command transport.
    pub fn new(config: MasterConfig, sender: Arc<dyn CommandSender>) -> Result<Self> {
        let core = ControllerCore::new(
            "timing master",
            &config.device,
            sender,
            config.policy(),
            MASTER_COMMANDS,
        )?;
        Ok(Self {
            config,
            core,
            scan_running: Arc::new(AtomicBool::new(false)),
            scan_thread: parking_lot::Mutex::new(None),
        })
    }

    /// Configure the master, or recover its previous state, and wait for it
    /// to report ready.
    pub fn configure(&self) -> Result<CoordinationOutcome> {
        let strict = self.config.strict_ready_checks;
        let outcome = self.core.coordinate(
            || self.send_configure_commands(),
            |state| ControlError::MasterNotReady {
                device: self.config.device.clone(),
                state,
            },
        )?;
        info!(device = %self.config.device, strict, ?outcome, "master configure done");
        Ok(outcome)
    }

    fn send_configure_commands(&self) {
        self.core.send("io_reset", json!({}));
        self.core.send("set_timestamp", json!({}));
    }

    /// Run start: zero the sent-command counters.
    pub fn start(&self) {
        self.core.counters().reset();
    }

    /// Reset the device IO block.
    pub fn io_reset(&self) {
        self.core.send("io_reset", json!({}));
    }

    /// Load the current time into the master timestamp register.
    pub fn set_timestamp(&self) {
        self.core.send("set_timestamp", json!({}));
    }

    /// Ask the device to log its status registers.
    pub fn print_status(&self) {
        self.core.send("print_status", json!({}));
    }

    /// Send a one-shot round-trip scan over the monitored endpoints.
    pub fn scan_endpoints(&self) {
        let payload = EndpointScanPayload {
            endpoints: self.config.monitored_endpoints.clone(),
        };
        self.core.send("endpoint_scan", serde_json::json!(payload));
    }

    /// Start the periodic endpoint scan thread. No-op when scanning is
    /// disabled, there is nothing to scan, or a scanner already runs.
    pub fn start_endpoint_scanning(&self) -> std::io::Result<()> {
        if self.config.endpoint_scan_period_ms == 0
            || self.config.monitored_endpoints.is_empty()
        {
            debug!(device = %self.config.device, "endpoint scanning disabled");
            return Ok(());
        }
        let mut slot = self.scan_thread.lock();
        if slot.is_some() {
            return Ok(());
        }

        self.scan_running.store(true, Ordering::Release);
        let running = Arc::clone(&self.scan_running);
        let sender = Arc::clone(self.core.sender());
        let counters = Arc::clone(self.core.counters());
        let device = self.config.device.clone();
        let period = Duration::from_millis(self.config.endpoint_scan_period_ms);
        let payload = EndpointScanPayload {
            endpoints: self.config.monitored_endpoints.clone(),
        };

        let handle = thread::Builder::new()
            .name("ept-scan".into())
            .spawn(move || {
                debug!(device = %device, ?period, "endpoint scan thread started");
                while running.load(Ordering::Acquire) {
                    let command = HwCommand::with_payload(
                        "endpoint_scan",
                        &device,
                        serde_json::json!(payload),
                    );
                    if let Err(error) = sender.send_command(command) {
                        warn!(device = %device, %error, "failed to push endpoint scan");
                    }
                    counters.increment("endpoint_scan");
                    thread::sleep(period);
                }
                debug!(device = %device, "endpoint scan thread stopped");
            })?;
        *slot = Some(handle);
        Ok(())
    }

    /// Stop the periodic endpoint scan thread and join it.
    pub fn stop_endpoint_scanning(&self) {
        self.scan_running.store(false, Ordering::Release);
        if let Some(handle) = self.scan_thread.lock().take() {
            if handle.join().is_err() {
                warn!(device = %self.config.device, "endpoint scan thread panicked");
            }
        }
    }

    /// Feed one status snapshot from the monitoring stream.
    pub fn handle_device_info(&self, info: &serde_json::Value) -> Result<()> {
        let status: MasterStatus = serde_json::from_value(info.clone())?;
        let (ready, flags) = predicates::master_ready(&status, self.config.strict_ready_checks);
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

impl Drop for MasterController {
    fn drop(&mut self) {
        self.stop_endpoint_scanning();
    }
}
