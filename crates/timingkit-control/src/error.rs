//! Control-plane error taxonomy.
//!
//! "Not ready on this poll" is never an error, it is retried inside the
//! coordinator. What surfaces here is fatal: an entity that failed to reach
//! ready within the bounded retry budget, or configuration that cannot be
//! acted on at all. A `…NotReady` error aborts the caller's configure
//! operation; partial hardware state is left in place for the next attempt.

/// Result alias for control operations.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Fatal control-plane errors.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// Endpoint did not become ready within the retry budget.
    #[error("{device}: timing endpoint did not become ready in time (state {state:#x})")]
    EndpointNotReady {
        /// Target device name.
        device: String,
        /// Last observed endpoint state code.
        state: u32,
    },

    /// Fanout did not become ready within the retry budget.
    #[error("{device}: timing fanout did not become ready in time (state {state:#x})")]
    FanoutNotReady {
        /// Target device name.
        device: String,
        /// Last observed endpoint state code.
        state: u32,
    },

    /// Master did not become ready within the retry budget.
    #[error("{device}: timing master did not become ready in time (status {state:#x})")]
    MasterNotReady {
        /// Target device name.
        device: String,
        /// Last observed readiness flag word.
        state: u32,
    },

    /// Partition did not become ready within the retry budget.
    #[error("{device}: timing partition did not become ready in time (status {state:#x})")]
    PartitionNotReady {
        /// Target device name.
        device: String,
        /// Last observed readiness flag word.
        state: u32,
    },

    /// Hit-summary interface did not become ready within the retry budget.
    #[error("{device}: HSI endpoint did not become ready in time (state {state:#x})")]
    HsiNotReady {
        /// Target device name.
        device: String,
        /// Last observed endpoint state code.
        state: u32,
    },

    /// Controllers refuse configs without a target device.
    #[error("device name should not be empty")]
    EmptyDeviceName,

    /// A status snapshot did not parse as the expected document shape.
    #[error("malformed device status snapshot: {0}")]
    MalformedStatus(#[from] serde_json::Error),
}

impl ControlError {
    /// Device name carried by a `…NotReady` error, if any.
    pub fn device(&self) -> Option<&str> {
        match self {
            Self::EndpointNotReady { device, .. }
            | Self::FanoutNotReady { device, .. }
            | Self::MasterNotReady { device, .. }
            | Self::PartitionNotReady { device, .. }
            | Self::HsiNotReady { device, .. } => Some(device),
            _ => None,
        }
    }

    /// Last observed status code carried by a `…NotReady` error, if any.
    pub fn last_state(&self) -> Option<u32> {
        match self {
            Self::EndpointNotReady { state, .. }
            | Self::FanoutNotReady { state, .. }
            | Self::MasterNotReady { state, .. }
            | Self::PartitionNotReady { state, .. }
            | Self::HsiNotReady { state, .. } => Some(*state),
            _ => None,
        }
    }
}
