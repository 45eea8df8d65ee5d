//! The bounded numeric channel behind every level entity
//!
//! A channel binds one level property of a device to a display scale, an
//! on/off predicate and a way of switching power. Light, fan, number and
//! media player entities are all channels with different parameters.

use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

use display_state::{DeviceSnapshot, DeviceState, LevelProperty, Mute};

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Mapping between a 0..1 level and the value the hub shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    /// Display value of level 1.0
    pub span: f64,
    /// Decimal places kept when converting a display value back to a level
    pub write_places: Option<i32>,
}

impl Scale {
    /// Level shown as is
    pub const UNIT: Scale = Scale {
        span: 1.0,
        write_places: None,
    };

    /// 0..255, written back with two decimals
    pub const BYTE: Scale = Scale {
        span: 255.0,
        write_places: Some(2),
    };

    /// 0..100, written back with two decimals
    pub const PERCENT: Scale = Scale {
        span: 100.0,
        write_places: Some(2),
    };

    pub fn to_display(&self, level: f64) -> f64 {
        level * self.span
    }

    pub fn from_display(&self, value: f64) -> f64 {
        let level = value / self.span;
        match self.write_places {
            Some(places) => round_to(level, places),
            None => level,
        }
    }
}

/// What turning a channel on or off does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerControl {
    /// Not supported
    None,
    /// Write a fixed level
    Level { on: f64, off: f64 },
    /// Unmute on, mute off; the level is left alone
    Mute,
}

fn level_positive<P: LevelProperty>(snapshot: &DeviceSnapshot) -> bool {
    P::project(snapshot).level() > 0.0
}

/// One level property exposed through a scale
#[derive(Debug, Clone)]
pub struct Channel<P: LevelProperty> {
    device: Arc<DeviceState>,
    scale: Scale,
    power: PowerControl,
    is_on: fn(&DeviceSnapshot) -> bool,
    _property: PhantomData<P>,
}

impl<P: LevelProperty> Channel<P> {
    /// A channel that is on while its level is above zero, without power control
    pub fn new(device: Arc<DeviceState>, scale: Scale) -> Self {
        Self {
            device,
            scale,
            power: PowerControl::None,
            is_on: level_positive::<P>,
            _property: PhantomData,
        }
    }

    pub fn with_power(mut self, power: PowerControl) -> Self {
        self.power = power;
        self
    }

    pub fn on_when(mut self, is_on: fn(&DeviceSnapshot) -> bool) -> Self {
        self.is_on = is_on;
        self
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Cached level in 0..1
    pub fn level(&self) -> f64 {
        self.device.get::<P>().level()
    }

    /// Cached level on the display scale
    pub fn display_value(&self) -> f64 {
        self.scale.to_display(self.level())
    }

    pub fn is_on(&self) -> bool {
        (self.is_on)(&self.device.snapshot())
    }

    pub async fn set_level(&self, level: f64) -> bool {
        self.device.set(P::from_level(level)).await
    }

    pub async fn set_display_value(&self, value: f64) -> bool {
        self.set_level(self.scale.from_display(value)).await
    }

    pub async fn turn_on(&self) -> bool {
        match self.power {
            PowerControl::None => self.unsupported("turn on"),
            PowerControl::Level { on, .. } => self.set_level(on).await,
            PowerControl::Mute => self.device.set(Mute::new(false)).await,
        }
    }

    pub async fn turn_off(&self) -> bool {
        match self.power {
            PowerControl::None => self.unsupported("turn off"),
            PowerControl::Level { off, .. } => self.set_level(off).await,
            PowerControl::Mute => self.device.set(Mute::new(true)).await,
        }
    }

    fn unsupported(&self, action: &str) -> bool {
        warn!("{} cannot {} its {} channel", self.device.id(), action, P::KEY);
        false
    }
}
