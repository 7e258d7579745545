//! Status-snapshot builders.
//!
//! Controllers parse entity-kind-specific JSON documents out of the status
//! stream; these helpers build well-formed ones for tests. Field names
//! mirror the structs in `timingkit-control`.

use serde_json::{json, Value};

/// Endpoint status document.
pub fn endpoint_status(state: u32, ready: bool) -> Value {
    json!({ "state": state, "ready": ready })
}

/// Fanout status document.
pub fn fanout_status(state: u32, ready: bool) -> Value {
    json!({ "state": state, "ready": ready })
}

/// Master status document with all link flags healthy.
pub fn healthy_master_status(timestamp: u64) -> Value {
    json!({
        "timestamp": timestamp,
        "ts_valid": true,
        "ts_tx_err": false,
        "tx_err": false,
        "ctrs_rdy": true,
    })
}

/// Master status document with explicit link flags.
pub fn master_status(
    timestamp: u64,
    ts_valid: bool,
    ts_tx_err: bool,
    tx_err: bool,
    ctrs_rdy: bool,
) -> Value {
    json!({
        "timestamp": timestamp,
        "ts_valid": ts_valid,
        "ts_tx_err": ts_tx_err,
        "tx_err": tx_err,
        "ctrs_rdy": ctrs_rdy,
    })
}

/// Partition status document.
pub fn partition_status(enabled: bool, in_error: bool, trigger_mask: u32) -> Value {
    json!({
        "enabled": enabled,
        "in_error": in_error,
        "trigger_mask": trigger_mask,
    })
}

/// Hit-summary-interface status document.
pub fn hsi_status(endpoint_state: u32) -> Value {
    json!({ "endpoint_state": endpoint_state })
}
