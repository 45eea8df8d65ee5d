//! Volume exposed as a fan
//!
//! The fan's speed percentage is the volume and its power is the mute state:
//! on means unmuted, regardless of the volume level.

use std::sync::Arc;

use display_state::{DeviceSnapshot, Volume};

use super::{Channel, Entity, EntityContext, EntityInfo, EntityKind, PowerControl, Scale};

fn unmuted(snapshot: &DeviceSnapshot) -> bool {
    !snapshot.muted
}

#[derive(Debug, Clone)]
pub struct FanEntity {
    context: Arc<EntityContext>,
    info: EntityInfo,
    channel: Channel<Volume>,
}

impl FanEntity {
    pub fn new(context: Arc<EntityContext>) -> Self {
        let name = context.name();
        let info = EntityInfo::new(
            EntityKind::Fan,
            format!("{}_volume", name),
            format!("{} Volume", name),
            context.device_info().clone(),
        )
        .with_icon("mdi:volume-high")
        .with_features(&["set_speed", "turn_on", "turn_off"]);

        let channel = Channel::new(Arc::clone(context.device()), Scale::PERCENT)
            .with_power(PowerControl::Mute)
            .on_when(unmuted);

        Self {
            context,
            info,
            channel,
        }
    }

    pub fn is_on(&self) -> bool {
        self.channel.is_on()
    }

    /// Volume as 0..100
    pub fn percentage(&self) -> u8 {
        self.channel.display_value().round().clamp(0.0, 100.0) as u8
    }

    pub async fn set_percentage(&self, percentage: u8) -> bool {
        if percentage == 0 {
            self.channel.set_level(0.0).await
        } else {
            self.channel.set_display_value(f64::from(percentage)).await
        }
    }

    /// Unmute, then apply the percentage if one is given
    pub async fn turn_on(&self, percentage: Option<u8>) -> bool {
        let powered = self.channel.turn_on().await;
        match percentage {
            Some(percentage) if powered => self.set_percentage(percentage).await,
            _ => powered,
        }
    }

    pub async fn turn_off(&self) -> bool {
        self.channel.turn_off().await
    }
}

impl Entity for FanEntity {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn context(&self) -> &EntityContext {
        &self.context
    }

    fn state(&self) -> serde_json::Value {
        serde_json::json!({
            "state": if self.is_on() { "on" } else { "off" },
            "percentage": self.percentage(),
        })
    }
}
