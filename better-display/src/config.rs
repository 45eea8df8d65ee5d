//! Persisted config entries, the setup form, and integration settings

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use display_state::PollerConfig;

use crate::error::{Result, SdkError};
use crate::source::{parse_source_list, SourceList};

pub const DOMAIN: &str = "hass_better_display";
pub const DEFAULT_NAME: &str = "HASS Better Display";
pub const DEFAULT_SOURCE_LIST: &str = "hdmi1:15,hdmi2:16,dp:17";

/// Newest config entry schema this crate understands
pub const ENTRY_VERSION: u32 = 1;

/// Form field names, also used as keys of validation errors
pub const CONF_DEVICE_NAME: &str = "device_name";
pub const CONF_BASE_URL: &str = "base_url";
pub const CONF_SOURCE_LIST: &str = "source_list";

/// Validation error keys shown next to a form field
pub const ERR_INVALID_SOURCE_LIST: &str = "invalid_source_list";
pub const ERR_INVALID_BASE_URL: &str = "invalid_base_url";
pub const ERR_INVALID_DEVICE_NAME: &str = "invalid_device_name";

/// Data stored for one configured monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryData {
    pub device_name: String,
    pub base_url: String,
    #[serde(default)]
    pub source_list: SourceList,
}

/// A versioned config entry as persisted by the hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub title: String,
    pub data: EntryData,
}

fn default_version() -> u32 {
    ENTRY_VERSION
}

impl ConfigEntry {
    /// A new current-version entry titled after the device
    pub fn new(entry_id: impl Into<String>, data: EntryData) -> Self {
        Self {
            entry_id: entry_id.into(),
            version: ENTRY_VERSION,
            title: data.device_name.clone(),
            data,
        }
    }

    /// Copy of this entry with different data, as an options update produces
    pub fn with_data(&self, data: EntryData) -> Self {
        Self {
            data,
            ..self.clone()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SdkError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SdkError::InvalidConfig(e.to_string()))
    }

    pub fn check_version(&self) -> Result<()> {
        if self.version > ENTRY_VERSION {
            return Err(SdkError::UnsupportedVersion {
                found: self.version,
                supported: ENTRY_VERSION,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Setup / options form
// ============================================================================

/// Raw form input, with the source list as a single string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInput {
    pub device_name: String,
    pub base_url: String,
    #[serde(default = "default_source_list")]
    pub source_list: String,
}

fn default_source_list() -> String {
    DEFAULT_SOURCE_LIST.to_string()
}

impl Default for EntryInput {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_NAME.to_string(),
            base_url: String::new(),
            source_list: default_source_list(),
        }
    }
}

impl EntryInput {
    /// Pre-fill a form from stored data
    pub fn from_data(data: &EntryData) -> Self {
        Self {
            device_name: data.device_name.clone(),
            base_url: data.base_url.clone(),
            source_list: data.source_list.format(),
        }
    }

    /// Check every field, returning stored data or the error key of each bad field
    pub fn validate(&self) -> std::result::Result<EntryData, BTreeMap<&'static str, &'static str>> {
        let mut errors = BTreeMap::new();

        let device_name = self.device_name.trim();
        if device_name.is_empty() {
            errors.insert(CONF_DEVICE_NAME, ERR_INVALID_DEVICE_NAME);
        }

        let base_url = match display_client::normalize_base_url(&self.base_url) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!("Rejected base URL: {}", e);
                errors.insert(CONF_BASE_URL, ERR_INVALID_BASE_URL);
                None
            }
        };

        let source_list = match parse_source_list(&self.source_list) {
            Ok(list) => Some(list),
            Err(e) => {
                tracing::debug!("Rejected source list: {}", e);
                errors.insert(CONF_SOURCE_LIST, ERR_INVALID_SOURCE_LIST);
                None
            }
        };

        match (base_url, source_list) {
            (Some(base_url), Some(source_list)) if errors.is_empty() => Ok(EntryData {
                device_name: device_name.to_string(),
                base_url,
                source_list,
            }),
            _ => Err(errors),
        }
    }
}

// ============================================================================
// Integration settings
// ============================================================================

/// Entity platforms an entry can expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Light,
    Number,
    Fan,
    MediaPlayer,
    Select,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Light,
        Platform::Number,
        Platform::Fan,
        Platform::MediaPlayer,
        Platform::Select,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Light => "light",
            Platform::Number => "number",
            Platform::Fan => "fan",
            Platform::MediaPlayer => "media_player",
            Platform::Select => "select",
        }
    }
}

/// Settings shared by every entry of one integration
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    pub poller: PollerConfig,

    /// Platforms whose entities are created
    /// Default: all of them
    pub platforms: Vec<Platform>,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            poller: PollerConfig::default(),
            platforms: Platform::ALL.to_vec(),
        }
    }
}

impl IntegrationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poller(mut self, poller: PollerConfig) -> Self {
        self.poller = poller;
        self
    }

    pub fn with_platforms(mut self, platforms: &[Platform]) -> Self {
        self.platforms = platforms.to_vec();
        self
    }

    pub fn is_enabled(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    pub fn validate(&self) -> Result<()> {
        self.poller.validate()?;
        if self.platforms.is_empty() {
            return Err(SdkError::InvalidConfig(
                "At least one platform must be enabled".to_string(),
            ));
        }
        Ok(())
    }
}
