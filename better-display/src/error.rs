use thiserror::Error;

/// Result type for better-display operations
pub type Result<T> = std::result::Result<T, SdkError>;

/// A malformed `label:code,label:code` source list
///
/// Any of these aborts the whole parse; no partial list is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Source list is empty")]
    Empty,

    #[error("Entry '{0}' has no ':' separator")]
    MissingSeparator(String),

    #[error("Entry '{0}' has an empty label")]
    EmptyLabel(String),

    #[error("Entry '{0}' has an empty code")]
    EmptyCode(String),

    #[error("Label '{0}' appears more than once")]
    DuplicateLabel(String),
}

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("State management error: {0}")]
    StateError(#[from] display_state::StateError),

    #[error("Client error: {0}")]
    ClientError(#[from] display_client::ClientError),

    #[error("Invalid source list: {0}")]
    Format(#[from] FormatError),

    #[error("Config entry not found: {0}")]
    EntryNotFound(String),

    #[error("Config entry already loaded: {0}")]
    EntryAlreadyLoaded(String),

    #[error("Device '{0}' is already configured by another entry")]
    DuplicateDevice(String),

    #[error("Device '{device}' is not ready: {reason}")]
    EntryNotReady { device: String, reason: String },

    #[error("Unsupported config entry version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}
