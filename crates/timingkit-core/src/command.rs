//! Outbound hardware command message shape.

use serde::{Deserialize, Serialize};

/// An opaque command for the hardware-access layer.
///
/// Controllers build these and hand them to a [`crate::CommandSender`];
/// the register-level interpretation of `id` and `payload` belongs entirely
/// to the receiving hardware manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HwCommand {
    /// Command identifier, e.g. `"endpoint_enable"`.
    pub id: String,
    /// Target device name.
    pub device: String,
    /// Command-specific structured payload.
    pub payload: serde_json::Value,
}

impl HwCommand {
    /// Build a command with an empty payload.
    pub fn new(id: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            device: device.into(),
            payload: serde_json::Value::Null,
        }
    }

    /// Build a command carrying `payload`.
    pub fn with_payload(
        id: impl Into<String>,
        device: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            device: device.into(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_carries_payload() {
        let cmd = HwCommand::with_payload("partition_enable", "master0", json!({"partition_id": 2}));
        assert_eq!(cmd.id, "partition_enable");
        assert_eq!(cmd.device, "master0");
        assert_eq!(cmd.payload["partition_id"], 2);
    }
}
