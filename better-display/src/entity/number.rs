//! Brightness and volume exposed as 0..1 number sliders

use std::sync::Arc;

use display_state::{Brightness, LevelProperty, Volume};

use super::{Channel, Entity, EntityCategory, EntityContext, EntityInfo, EntityKind, Scale};

pub const NUMBER_MIN: f64 = 0.0;
pub const NUMBER_MAX: f64 = 1.0;
pub const NUMBER_STEP: f64 = 1.0 / 16.0;

/// Per-property metadata of a number entity
pub trait NumberChannel: LevelProperty {
    const LABEL: &'static str;
    const ICON: &'static str;
    const DEVICE_CLASS: &'static str;
}

impl NumberChannel for Brightness {
    const LABEL: &'static str = "Brightness";
    const ICON: &'static str = "mdi:brightness-6";
    const DEVICE_CLASS: &'static str = "brightness";
}

impl NumberChannel for Volume {
    const LABEL: &'static str = "Volume";
    const ICON: &'static str = "mdi:volume-high";
    const DEVICE_CLASS: &'static str = "volume";
}

/// A config slider passing the level straight through
#[derive(Debug, Clone)]
pub struct NumberEntity<P: NumberChannel> {
    context: Arc<EntityContext>,
    info: EntityInfo,
    channel: Channel<P>,
}

pub type BrightnessNumber = NumberEntity<Brightness>;
pub type VolumeNumber = NumberEntity<Volume>;

impl<P: NumberChannel> NumberEntity<P> {
    pub fn new(context: Arc<EntityContext>) -> Self {
        let name = context.name();
        let info = EntityInfo::new(
            EntityKind::Number,
            format!("{}_{}_number", name, P::KEY),
            format!("{} {}", name, P::LABEL),
            context.device_info().clone(),
        )
        .with_icon(P::ICON)
        .with_device_class(P::DEVICE_CLASS)
        .with_category(EntityCategory::Config)
        .with_translation_key(P::KEY);

        let channel = Channel::new(Arc::clone(context.device()), Scale::UNIT);

        Self {
            context,
            info,
            channel,
        }
    }

    pub fn value(&self) -> f64 {
        self.channel.display_value()
    }

    /// Write a value; out-of-range input is clamped to 0..1
    pub async fn set_value(&self, value: f64) -> bool {
        self.channel.set_display_value(value).await
    }
}

impl<P: NumberChannel> Entity for NumberEntity<P> {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn context(&self) -> &EntityContext {
        &self.context
    }

    fn state(&self) -> serde_json::Value {
        serde_json::json!({
            "state": self.value(),
            "min": NUMBER_MIN,
            "max": NUMBER_MAX,
            "step": NUMBER_STEP,
        })
    }
}
