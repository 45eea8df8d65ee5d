//! Configuration for the refresh poller

use std::time::Duration;

use crate::error::{Result, StateError};

/// Configuration for a [`Poller`](crate::Poller)
#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    /// Time between periodic refreshes
    /// Default: 30 seconds
    pub update_interval: Duration,

    /// Upper bound for one whole refresh, and for each write
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// Delay between a refresh request and the refresh it triggers.
    /// Requests arriving during the delay fold into the same refresh.
    /// Default: 1 second
    pub refresh_debounce: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            refresh_debounce: Duration::from_secs(1),
        }
    }
}

impl PollerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short interval for monitors that change often from other sources
    pub fn fast() -> Self {
        Self {
            update_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(4),
            refresh_debounce: Duration::from_millis(250),
        }
    }

    /// Long interval for rarely touched monitors
    pub fn relaxed() -> Self {
        Self {
            update_interval: Duration::from_secs(120),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.update_interval.is_zero() {
            return Err(StateError::InvalidConfig(
                "Update interval must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StateError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout > self.update_interval {
            return Err(StateError::InvalidConfig(
                "Request timeout must not exceed the update interval".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_refresh_debounce(mut self, debounce: Duration) -> Self {
        self.refresh_debounce = debounce;
        self
    }
}
