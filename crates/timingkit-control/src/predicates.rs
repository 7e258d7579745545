//! Readiness predicates.
//!
//! Pure functions from a status snapshot to `(ready, status_code)`. They are
//! evaluated on every snapshot arrival, so they must be idempotent and never
//! log; edge-triggered transition logging happens where the result is
//! recorded, in [`crate::DeviceReadiness::record`].

use crate::status::{EndpointStatus, FanoutStatus, HsiStatus, MasterStatus, PartitionStatus};

/// Endpoint state code meaning "up and locked".
pub const ENDPOINT_STATE_READY: u32 = 0x8;

/// Fanout endpoint states strictly inside this open interval count as
/// usable (late bring-up states short of full lock).
pub const FANOUT_STATE_LOW: u32 = 0x5;
pub const FANOUT_STATE_HIGH: u32 = 0x9;

/// Bit assignments of the master readiness flag word.
const MASTER_FLAG_TS_NONZERO: u32 = 1 << 0;
const MASTER_FLAG_TS_VALID: u32 = 1 << 1;
const MASTER_FLAG_TS_TX_ERR: u32 = 1 << 2;
const MASTER_FLAG_TX_ERR: u32 = 1 << 3;
const MASTER_FLAG_CTRS_RDY: u32 = 1 << 4;

/// Bit assignments of the partition readiness flag word.
const PARTITION_FLAG_ENABLED: u32 = 1 << 0;
const PARTITION_FLAG_IN_ERROR: u32 = 1 << 1;
const PARTITION_FLAG_MASK_MATCH: u32 = 1 << 2;

/// Endpoint: fixed state code plus firmware ready flag.
pub fn endpoint_ready(status: &EndpointStatus) -> (bool, u32) {
    (
        status.state == ENDPOINT_STATE_READY && status.ready,
        status.state,
    )
}

/// Fanout: state strictly within the usable band.
pub fn fanout_ready(status: &FanoutStatus) -> (bool, u32) {
    (
        status.state > FANOUT_STATE_LOW && status.state < FANOUT_STATE_HIGH,
        status.state,
    )
}

/// Master: non-zero timestamp; with `strict`, all link flags must be
/// healthy too. The returned status code is a flag word describing which
/// conditions held.
pub fn master_ready(status: &MasterStatus, strict: bool) -> (bool, u32) {
    let ts_nonzero = status.timestamp != 0;
    let flags_ok =
        status.ts_valid && !status.ts_tx_err && !status.tx_err && status.ctrs_rdy;

    let mut word = 0;
    if ts_nonzero {
        word |= MASTER_FLAG_TS_NONZERO;
    }
    if status.ts_valid {
        word |= MASTER_FLAG_TS_VALID;
    }
    if status.ts_tx_err {
        word |= MASTER_FLAG_TS_TX_ERR;
    }
    if status.tx_err {
        word |= MASTER_FLAG_TX_ERR;
    }
    if status.ctrs_rdy {
        word |= MASTER_FLAG_CTRS_RDY;
    }

    (ts_nonzero && (!strict || flags_ok), word)
}

/// Partition: enabled, error-free, and the applied trigger mask matches the
/// configured expectation.
pub fn partition_ready(status: &PartitionStatus, expected_trigger_mask: u32) -> (bool, u32) {
    let mask_match = status.trigger_mask == expected_trigger_mask;

    let mut word = 0;
    if status.enabled {
        word |= PARTITION_FLAG_ENABLED;
    }
    if status.in_error {
        word |= PARTITION_FLAG_IN_ERROR;
    }
    if mask_match {
        word |= PARTITION_FLAG_MASK_MATCH;
    }

    (status.enabled && !status.in_error && mask_match, word)
}

/// HSI: its timing endpoint must be in the ready state.
pub fn hsi_ready(status: &HsiStatus) -> (bool, u32) {
    (
        status.endpoint_state == ENDPOINT_STATE_READY,
        status.endpoint_state,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_requires_state_and_flag() {
        let ready = EndpointStatus {
            state: 0x8,
            ready: true,
        };
        assert_eq!(endpoint_ready(&ready), (true, 0x8));

        let wrong_state = EndpointStatus {
            state: 0x6,
            ready: true,
        };
        assert_eq!(endpoint_ready(&wrong_state), (false, 0x6));

        let flag_down = EndpointStatus {
            state: 0x8,
            ready: false,
        };
        assert_eq!(endpoint_ready(&flag_down), (false, 0x8));
    }

    #[test]
    fn fanout_band_is_exclusive() {
        let status = |state| FanoutStatus { state, ready: true };
        assert!(!fanout_ready(&status(0x5)).0);
        assert!(fanout_ready(&status(0x6)).0);
        assert!(fanout_ready(&status(0x8)).0);
        assert!(!fanout_ready(&status(0x9)).0);
    }

    #[test]
    fn lenient_master_only_needs_a_timestamp() {
        let status = MasterStatus {
            timestamp: 42,
            ts_valid: false,
            ts_tx_err: true,
            tx_err: true,
            ctrs_rdy: false,
        };
        assert!(master_ready(&status, false).0);
        assert!(!master_ready(&status, true).0);
    }

    #[test]
    fn strict_master_needs_all_flags() {
        let healthy = MasterStatus {
            timestamp: 42,
            ts_valid: true,
            ts_tx_err: false,
            tx_err: false,
            ctrs_rdy: true,
        };
        let (ready, word) = master_ready(&healthy, true);
        assert!(ready);
        assert_eq!(
            word,
            MASTER_FLAG_TS_NONZERO | MASTER_FLAG_TS_VALID | MASTER_FLAG_CTRS_RDY
        );

        let zero_ts = MasterStatus {
            timestamp: 0,
            ..healthy
        };
        assert!(!master_ready(&zero_ts, true).0);
        assert!(!master_ready(&zero_ts, false).0);
    }

    #[test]
    fn partition_compound_match() {
        let good = PartitionStatus {
            enabled: true,
            in_error: false,
            trigger_mask: 0xff,
        };
        assert!(partition_ready(&good, 0xff).0);
        assert!(!partition_ready(&good, 0x0f).0);

        let errored = PartitionStatus {
            in_error: true,
            ..good
        };
        assert!(!partition_ready(&errored, 0xff).0);
    }

    #[test]
    fn hsi_single_state_match() {
        assert!(hsi_ready(&HsiStatus { endpoint_state: 0x8 }).0);
        assert!(!hsi_ready(&HsiStatus { endpoint_state: 0x7 }).0);
    }
}
