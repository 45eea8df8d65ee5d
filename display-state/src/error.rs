//! Error types for display-state

use display_client::ClientError;
use thiserror::Error;

use crate::model::DeviceId;

/// Result type for display-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors that can occur while reading or writing device state
#[derive(Debug, Error)]
pub enum StateError {
    /// Transport failure or timeout during an HTTP call
    ///
    /// Aborts the refresh cycle it occurred in.
    #[error("Error communicating with device {device}: {source}")]
    Communication {
        device: DeviceId,
        #[source]
        source: ClientError,
    },

    /// The control server answered a single feature with a non-200 status
    #[error("Device {device} rejected {feature}: HTTP {status}")]
    FeatureRejected {
        device: DeviceId,
        feature: &'static str,
        status: u16,
    },

    /// The poller task is no longer running
    #[error("Poller for device {0} has stopped")]
    PollerStopped(DeviceId),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

impl StateError {
    /// Whether this error aborts a refresh (as opposed to degrading one field)
    pub fn is_communication(&self) -> bool {
        matches!(self, StateError::Communication { .. })
    }
}
