//! # better-display - smart-home entities for BetterDisplay monitors
//!
//! Exposes a monitor's brightness, volume, mute state and input source,
//! as reported by a BetterDisplay HTTP control server, as hub entities:
//!
//! | Entity | Shows | Writes |
//! |---|---|---|
//! | [`LightEntity`] | brightness as 0..255, on while > 0 | brightness |
//! | [`BrightnessNumber`] | brightness 0..1 | brightness |
//! | [`FanEntity`] | volume as 0..100 %, on while unmuted | volume, mute |
//! | [`VolumeNumber`] | volume 0..1 | volume |
//! | [`MediaPlayerEntity`] | volume 0..1, muted at 0 | volume |
//! | [`SelectEntity`] | configured sources as "switch to {label}" | input source |
//!
//! ```rust,no_run
//! use better_display::{ConfigEntry, EntryInput, Integration, IntegrationConfig, SdkError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SdkError> {
//!     let integration = Integration::new(IntegrationConfig::default())?;
//!
//!     let data = EntryInput {
//!         device_name: "DELL U2720Q".to_string(),
//!         base_url: "http://192.168.6.248:55777".to_string(),
//!         ..Default::default()
//!     }
//!     .validate()
//!     .map_err(|errors| SdkError::InvalidConfig(format!("{:?}", errors)))?;
//!
//!     let monitor = integration.setup_entry(&ConfigEntry::new("office", data)).await?;
//!     if let Some(light) = &monitor.light {
//!         light.turn_on(Some(128)).await;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! better-display (Integration, Monitor, entities, source lists)
//!     ↓
//! display-state (DeviceState cache, Poller)
//!     ↓
//! display-client (GET /get, GET /set)
//! ```

mod error;
mod integration;
mod monitor;

pub mod config;
pub mod entity;
pub mod source;

pub use config::{
    ConfigEntry, EntryData, EntryInput, IntegrationConfig, Platform, DEFAULT_NAME,
    DEFAULT_SOURCE_LIST, DOMAIN, ENTRY_VERSION,
};
pub use entity::{
    BrightnessNumber, DeviceInfo, Entity, EntityInfo, EntityKind, FanEntity, LightEntity,
    MediaPlayerEntity, NumberEntity, SelectEntity, StateUpdates, VolumeNumber,
};
pub use error::{FormatError, Result, SdkError};
pub use integration::{Integration, ReloadKind};
pub use monitor::Monitor;
pub use source::{parse_source_list, SourceCatalog, SourceList, SourceMap};

pub use display_state::{logging, DeviceSnapshot, DeviceState, PollerConfig, PollerStats};
