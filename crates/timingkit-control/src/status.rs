//! Typed views of the per-entity status snapshot documents.
//!
//! The snapshot transport delivers opaque structured documents; each
//! controller parses the shape for its own entity kind here before applying
//! its readiness predicate. Unknown fields are ignored so firmware-side
//! additions do not break parsing.

use serde::{Deserialize, Serialize};

/// Timing endpoint status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EndpointStatus {
    /// Endpoint state machine code.
    pub state: u32,
    /// Firmware-reported ready flag.
    pub ready: bool,
}

/// Fanout status. Fanouts report through their embedded endpoint block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FanoutStatus {
    /// Endpoint state machine code.
    pub state: u32,
    /// Firmware-reported ready flag.
    pub ready: bool,
}

/// Timing master status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MasterStatus {
    /// Free-running master timestamp; zero until the clock is up.
    pub timestamp: u64,
    /// Timestamp-valid flag.
    #[serde(default = "default_true")]
    pub ts_valid: bool,
    /// Timestamp transmit error flag.
    #[serde(default)]
    pub ts_tx_err: bool,
    /// General transmit error flag.
    #[serde(default)]
    pub tx_err: bool,
    /// Counters-ready flag.
    #[serde(default = "default_true")]
    pub ctrs_rdy: bool,
}

/// Timing partition status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PartitionStatus {
    /// Partition enabled flag.
    pub enabled: bool,
    /// Partition error flag.
    #[serde(default)]
    pub in_error: bool,
    /// Currently applied trigger mask.
    pub trigger_mask: u32,
}

/// Hit-summary-interface status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HsiStatus {
    /// State code of the HSI's timing endpoint.
    pub endpoint_state: u32,
}

fn default_true() -> bool {
    true
}
