//! Error types for the display client

use thiserror::Error;

/// Errors that can occur while talking to the control server
///
/// A non-200 reply is not an error at this layer: the caller receives the
/// [`Reply`](crate::Reply) and decides what a rejected feature means.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL could not be parsed
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection refused, reset, DNS failure and similar
    #[error("Network/HTTP error: {0}")]
    Transport(String),

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be read as text
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ClientError::InvalidUrl {
            url: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid base URL 'nope': relative URL without a base"
        );

        let error = ClientError::Transport("connection refused".to_string());
        assert_eq!(error.to_string(), "Network/HTTP error: connection refused");

        assert_eq!(ClientError::Timeout.to_string(), "Request timed out");
    }
}
