//! Typed command payloads.
//!
//! Serialized into the opaque `payload` of a
//! [`HwCommand`](timingkit_core::HwCommand); the hardware-access layer on
//! the far side deserializes the matching shape.

use serde::{Deserialize, Serialize};

/// Payload addressing one endpoint on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCmdPayload {
    /// Endpoint index on the target device.
    pub endpoint_id: u32,
}

/// Payload for enabling/resetting an endpoint with its link parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfigureCmdPayload {
    /// Endpoint index on the target device.
    pub endpoint_id: u32,
    /// Timing address assigned to the endpoint.
    pub address: u32,
    /// Partition the endpoint listens to.
    pub partition: u32,
}

/// Payload addressing one partition on a master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionCmdPayload {
    /// Partition index on the target device.
    pub partition_id: u32,
}

/// Payload applying a partition's trigger configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfigureCmdPayload {
    /// Partition index on the target device.
    pub partition_id: u32,
    /// Trigger mask to apply.
    pub trigger_mask: u32,
    /// Whether spill-gate rate control is enabled.
    pub rate_control_enabled: bool,
}

/// Where a monitored endpoint hangs off the timing tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointLocation {
    /// Timing address of the endpoint.
    pub address: u32,
    /// Fanout slot it is reached through, `-1` for a direct link.
    pub fanout_slot: i32,
    /// SFP slot on that fanout.
    pub sfp_slot: i32,
}

/// Payload for a master round-trip scan over its monitored endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointScanPayload {
    /// Endpoints to scan.
    pub endpoints: Vec<EndpointLocation>,
}

/// Payload carrying the HSI trigger configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsiConfigureCmdPayload {
    /// Signal mask for rising-edge triggers.
    pub rising_edge_mask: u32,
    /// Signal mask for falling-edge triggers.
    pub falling_edge_mask: u32,
    /// Signal mask inverting edge polarity.
    pub invert_edge_mask: u32,
    /// Which signal source feeds the HSI.
    pub data_source: u32,
    /// Emulated random trigger rate in Hz, when the source is emulated.
    pub random_rate: f64,
}
