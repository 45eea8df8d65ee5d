use std::sync::Arc;

use display_state::Volume;

use super::{Channel, Entity, EntityContext, EntityInfo, EntityKind, Scale};

/// Volume exposed as a media player that only supports setting the level
///
/// On while the volume is above zero; reported muted at zero.
#[derive(Debug, Clone)]
pub struct MediaPlayerEntity {
    context: Arc<EntityContext>,
    info: EntityInfo,
    channel: Channel<Volume>,
}

impl MediaPlayerEntity {
    pub fn new(context: Arc<EntityContext>) -> Self {
        let name = context.name();
        let info = EntityInfo::new(
            EntityKind::MediaPlayer,
            format!("{}_volume_player", name),
            format!("{} Speaker", name),
            context.device_info().clone(),
        )
        .with_icon("mdi:volume-high")
        .with_features(&["volume_set"]);

        let channel = Channel::new(Arc::clone(context.device()), Scale::UNIT);

        Self {
            context,
            info,
            channel,
        }
    }

    pub fn is_on(&self) -> bool {
        self.channel.is_on()
    }

    pub fn volume_level(&self) -> f64 {
        self.channel.display_value()
    }

    pub fn is_volume_muted(&self) -> bool {
        self.volume_level() <= 0.0
    }

    pub async fn set_volume_level(&self, level: f64) -> bool {
        self.channel.set_display_value(level).await
    }
}

impl Entity for MediaPlayerEntity {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn context(&self) -> &EntityContext {
        &self.context
    }

    fn state(&self) -> serde_json::Value {
        serde_json::json!({
            "state": if self.is_on() { "on" } else { "off" },
            "volume_level": self.volume_level(),
            "is_volume_muted": self.is_volume_muted(),
        })
    }
}
