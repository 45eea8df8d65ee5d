//! Monitor handle with its entities
//!
//! One handle per loaded config entry. Entity fields are `None` for
//! platforms disabled in the [`IntegrationConfig`](crate::IntegrationConfig).

use std::sync::Arc;

use display_state::{DeviceSnapshot, DeviceState};

use crate::config::Platform;
use crate::entity::{
    BrightnessNumber, DeviceInfo, Entity, EntityContext, FanEntity, LightEntity,
    MediaPlayerEntity, SelectEntity, VolumeNumber,
};
use crate::source::SourceCatalog;

/// Monitor handle with entity access
///
/// # Example
///
/// ```rust,ignore
/// if let Some(light) = &monitor.light {
///     light.turn_on(Some(128)).await;
/// }
/// if let Some(select) = &monitor.select {
///     select.select_option("switch to hdmi2").await;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Monitor {
    /// Device name as configured
    pub name: String,
    context: Arc<EntityContext>,

    // ========================================================================
    // Brightness
    // ========================================================================
    pub light: Option<LightEntity>,
    pub brightness_number: Option<BrightnessNumber>,

    // ========================================================================
    // Volume
    // ========================================================================
    pub fan: Option<FanEntity>,
    pub volume_number: Option<VolumeNumber>,
    pub media_player: Option<MediaPlayerEntity>,

    // ========================================================================
    // Input
    // ========================================================================
    pub select: Option<SelectEntity>,
}

impl Monitor {
    pub(crate) fn new(
        context: Arc<EntityContext>,
        catalog: SourceCatalog,
        platforms: &[Platform],
    ) -> Self {
        let enabled = |platform: Platform| platforms.contains(&platform);
        let ctx = || Arc::clone(&context);

        Self {
            name: context.name().to_string(),
            light: enabled(Platform::Light).then(|| LightEntity::new(ctx())),
            brightness_number: enabled(Platform::Number).then(|| BrightnessNumber::new(ctx())),
            fan: enabled(Platform::Fan).then(|| FanEntity::new(ctx())),
            volume_number: enabled(Platform::Number).then(|| VolumeNumber::new(ctx())),
            media_player: enabled(Platform::MediaPlayer).then(|| MediaPlayerEntity::new(ctx())),
            select: enabled(Platform::Select).then(|| SelectEntity::new(ctx(), catalog)),
            context,
        }
    }

    pub fn device(&self) -> &Arc<DeviceState> {
        self.context.device()
    }

    pub fn device_info(&self) -> &DeviceInfo {
        self.context.device_info()
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        self.context.device().snapshot()
    }

    pub fn available(&self) -> bool {
        self.context.device().is_available()
    }

    /// Every enabled entity, in registration order
    pub fn entities(&self) -> Vec<&dyn Entity> {
        let mut entities: Vec<&dyn Entity> = Vec::new();
        if let Some(e) = &self.light {
            entities.push(e);
        }
        if let Some(e) = &self.brightness_number {
            entities.push(e);
        }
        if let Some(e) = &self.fan {
            entities.push(e);
        }
        if let Some(e) = &self.volume_number {
            entities.push(e);
        }
        if let Some(e) = &self.media_player {
            entities.push(e);
        }
        if let Some(e) = &self.select {
            entities.push(e);
        }
        entities
    }

    pub fn entity(&self, unique_id: &str) -> Option<&dyn Entity> {
        self.entities()
            .into_iter()
            .find(|e| e.info().unique_id == unique_id)
    }
}
