//! Hub entities for one monitor
//!
//! Every entity is a stateless view over a shared [`DeviceState`]: reads
//! project the cached snapshot, writes go through the device and never raise.
//! [`Channel`] carries the shared numeric behavior; the per-platform types
//! only add metadata and unit conversion.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use display_state::{DeviceSnapshot, DeviceState};

use crate::config::DOMAIN;
use crate::source::SourceMap;

pub mod channel;
pub mod fan;
pub mod light;
pub mod media_player;
pub mod number;
pub mod select;

pub use channel::{Channel, PowerControl, Scale};
pub use fan::FanEntity;
pub use light::LightEntity;
pub use media_player::MediaPlayerEntity;
pub use number::{BrightnessNumber, NumberEntity, VolumeNumber};
pub use select::SelectEntity;

pub const MANUFACTURER: &str = "HASS Better Display";
pub const MODEL: &str = "Display Controller";
pub const SW_VERSION: &str = "1.0.0";
pub const SUGGESTED_AREA: &str = "Office";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Light,
    Number,
    Fan,
    MediaPlayer,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Config,
}

/// Device registry entry shared by all entities of one monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub sw_version: &'static str,
    pub suggested_area: &'static str,
    pub entry_type: &'static str,
    pub configuration_url: String,
}

impl DeviceInfo {
    pub fn new(name: &str, configuration_url: &str) -> Self {
        Self {
            identifiers: vec![(DOMAIN.to_string(), name.to_string())],
            name: name.to_string(),
            manufacturer: MANUFACTURER,
            model: MODEL,
            sw_version: SW_VERSION,
            suggested_area: SUGGESTED_AREA,
            entry_type: "service",
            configuration_url: configuration_url.to_string(),
        }
    }

    /// `{domain}_{name}`, the prefix of device-scoped unique ids
    pub fn unique_id(&self) -> String {
        format!("{}_{}", DOMAIN, self.name)
    }
}

/// Static registration metadata of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityInfo {
    pub unique_id: String,
    pub name: String,
    pub kind: EntityKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_category: Option<EntityCategory>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_key: Option<&'static str>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supported_features: Vec<&'static str>,

    pub device: DeviceInfo,
}

impl EntityInfo {
    pub fn new(kind: EntityKind, unique_id: String, name: String, device: DeviceInfo) -> Self {
        Self {
            unique_id,
            name,
            kind,
            icon: None,
            device_class: None,
            entity_category: None,
            translation_key: None,
            supported_features: Vec::new(),
            device,
        }
    }

    pub fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_device_class(mut self, device_class: &'static str) -> Self {
        self.device_class = Some(device_class);
        self
    }

    pub fn with_category(mut self, category: EntityCategory) -> Self {
        self.entity_category = Some(category);
        self
    }

    pub fn with_translation_key(mut self, key: &'static str) -> Self {
        self.translation_key = Some(key);
        self
    }

    pub fn with_features(mut self, features: &[&'static str]) -> Self {
        self.supported_features = features.to_vec();
        self
    }
}

/// Shared per-monitor context, cloned into every entity by `Arc`
#[derive(Debug)]
pub struct EntityContext {
    pub(crate) device: Arc<DeviceState>,
    pub(crate) device_info: DeviceInfo,
}

impl EntityContext {
    pub fn new(device: Arc<DeviceState>, device_info: DeviceInfo) -> Arc<Self> {
        Arc::new(Self {
            device,
            device_info,
        })
    }

    pub fn device(&self) -> &Arc<DeviceState> {
        &self.device
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Device name as configured
    pub fn name(&self) -> &str {
        &self.device_info.name
    }
}

/// Common surface of every entity
pub trait Entity: Send + Sync {
    fn info(&self) -> &EntityInfo;

    fn context(&self) -> &EntityContext;

    /// Current state as the hub renders it
    fn state(&self) -> serde_json::Value;

    /// False while the last refresh of the device failed
    fn available(&self) -> bool {
        self.context().device.is_available()
    }

    /// Change notifications for re-rendering
    fn updates(&self) -> StateUpdates {
        StateUpdates::new(self.context().device.as_ref(), None)
    }
}

/// Waits for anything that can change how an entity renders
pub struct StateUpdates {
    snapshot: watch::Receiver<DeviceSnapshot>,
    availability: watch::Receiver<bool>,
    sources: Option<watch::Receiver<Arc<SourceMap>>>,
}

impl StateUpdates {
    pub(crate) fn new(
        device: &DeviceState,
        sources: Option<watch::Receiver<Arc<SourceMap>>>,
    ) -> Self {
        Self {
            snapshot: device.watch(),
            availability: device.watch_availability(),
            sources,
        }
    }

    /// Resolve on the next change; `false` once the device is gone
    pub async fn changed(&mut self) -> bool {
        let sources = self.sources.as_mut();
        let sources = async move {
            match sources {
                Some(rx) => rx.changed().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = self.snapshot.changed() => result.is_ok(),
            result = self.availability.changed() => result.is_ok(),
            result = sources => result.is_ok(),
        }
    }
}
