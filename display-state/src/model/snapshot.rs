use serde::{Deserialize, Serialize};

/// Last known state of one monitor
///
/// Every field reflects the last successful read or write. A failed read
/// leaves the previous value in place, so a snapshot never goes back to
/// "unknown" once populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Brightness in 0.0..=1.0
    pub brightness: f64,
    /// Volume in 0.0..=1.0
    pub volume: f64,
    /// Derived from the "on"/"off" mute token
    pub muted: bool,
    /// Device-native code of the selected input
    pub source_code: String,
}

impl DeviceSnapshot {
    pub const DEFAULT_LEVEL: f64 = 0.5;
    pub const DEFAULT_SOURCE: &'static str = "0";
}

impl Default for DeviceSnapshot {
    fn default() -> Self {
        Self {
            brightness: Self::DEFAULT_LEVEL,
            volume: Self::DEFAULT_LEVEL,
            muted: false,
            source_code: Self::DEFAULT_SOURCE.to_string(),
        }
    }
}
