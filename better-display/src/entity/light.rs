//! Brightness exposed as a dimmable light

use std::sync::Arc;

use display_state::Brightness;

use super::{Channel, Entity, EntityContext, EntityInfo, EntityKind, PowerControl, Scale};

/// Light whose 0..255 brightness drives the backlight
///
/// On while brightness is above zero. Turning on without a level sets full
/// brightness; turning off sets zero.
#[derive(Debug, Clone)]
pub struct LightEntity {
    context: Arc<EntityContext>,
    info: EntityInfo,
    channel: Channel<Brightness>,
}

impl LightEntity {
    pub fn new(context: Arc<EntityContext>) -> Self {
        let name = context.name();
        let info = EntityInfo::new(
            EntityKind::Light,
            format!("{}_brightness", name),
            format!("{} Brightness", name),
            context.device_info().clone(),
        )
        .with_icon("mdi:brightness-6")
        .with_features(&["brightness"]);

        let channel = Channel::new(Arc::clone(context.device()), Scale::BYTE)
            .with_power(PowerControl::Level { on: 1.0, off: 0.0 });

        Self {
            context,
            info,
            channel,
        }
    }

    pub fn is_on(&self) -> bool {
        self.channel.is_on()
    }

    /// Brightness on the 0..255 scale
    pub fn brightness(&self) -> u8 {
        self.channel.display_value().round().clamp(0.0, 255.0) as u8
    }

    pub async fn turn_on(&self, brightness: Option<u8>) -> bool {
        match brightness {
            Some(level) => self.channel.set_display_value(f64::from(level)).await,
            None => self.channel.turn_on().await,
        }
    }

    pub async fn turn_off(&self) -> bool {
        self.channel.turn_off().await
    }
}

impl Entity for LightEntity {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn context(&self) -> &EntityContext {
        &self.context
    }

    fn state(&self) -> serde_json::Value {
        serde_json::json!({
            "state": if self.is_on() { "on" } else { "off" },
            "brightness": self.brightness(),
            "color_mode": "brightness",
        })
    }
}
