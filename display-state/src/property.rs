//! Property trait and the four monitor properties
//!
//! A property is one controllable feature of a monitor. Each property:
//! - Has a unique key for identification
//! - Is bound to one wire feature of the control server
//! - Knows how to decode a response body and encode a write value
//! - Projects itself out of, and applies itself onto, a [`DeviceSnapshot`]

use display_client::Feature;
use std::fmt;

use crate::model::DeviceSnapshot;

/// A typed, cacheable monitor feature
///
/// # Example
///
/// ```rust,ignore
/// let volume: Volume = device.get();
/// device.set(Volume::new(0.3)).await;
/// ```
pub trait Property: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Stable key used in logs and diagnostics
    const KEY: &'static str;

    /// Wire feature this property reads and writes
    const FEATURE: Feature;

    /// Parse a response body
    ///
    /// Returns `None` when the body does not hold a valid value; the cached
    /// value is then left untouched.
    fn decode(body: &str) -> Option<Self>;

    /// Value sent as `value=` (or `ddc=` for the input source) on writes
    fn encode(&self) -> String;

    /// Value assumed when the server rejects a read of this feature
    fn fallback() -> Option<Self> {
        None
    }

    /// Read this property out of a snapshot
    fn project(snapshot: &DeviceSnapshot) -> Self;

    /// Store this property in a snapshot, returning whether it changed
    fn apply(self, snapshot: &mut DeviceSnapshot) -> bool;
}

/// A property carried as a level in 0.0..=1.0
pub trait LevelProperty: Property {
    fn level(&self) -> f64;

    /// Build from a level, clamped into 0.0..=1.0
    fn from_level(level: f64) -> Self;
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn decode_level(body: &str) -> Option<f64> {
    body.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

// ============================================================================
// Levels
// ============================================================================

/// Backlight brightness (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brightness(pub f64);

impl Brightness {
    pub fn new(level: f64) -> Self {
        Self(level)
    }
}

impl Property for Brightness {
    const KEY: &'static str = "brightness";
    const FEATURE: Feature = Feature::Brightness;

    fn decode(body: &str) -> Option<Self> {
        decode_level(body).map(Self)
    }

    fn encode(&self) -> String {
        self.0.to_string()
    }

    fn project(snapshot: &DeviceSnapshot) -> Self {
        Self(snapshot.brightness)
    }

    fn apply(self, snapshot: &mut DeviceSnapshot) -> bool {
        replace(&mut snapshot.brightness, self.0)
    }
}

impl LevelProperty for Brightness {
    fn level(&self) -> f64 {
        self.0
    }

    fn from_level(level: f64) -> Self {
        Self(clamp_level(level))
    }
}

/// Built-in speaker volume (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume(pub f64);

impl Volume {
    pub fn new(level: f64) -> Self {
        Self(level)
    }
}

impl Property for Volume {
    const KEY: &'static str = "volume";
    const FEATURE: Feature = Feature::Volume;

    fn decode(body: &str) -> Option<Self> {
        decode_level(body).map(Self)
    }

    fn encode(&self) -> String {
        self.0.to_string()
    }

    fn project(snapshot: &DeviceSnapshot) -> Self {
        Self(snapshot.volume)
    }

    fn apply(self, snapshot: &mut DeviceSnapshot) -> bool {
        replace(&mut snapshot.volume, self.0)
    }
}

impl LevelProperty for Volume {
    fn level(&self) -> f64 {
        self.0
    }

    fn from_level(level: f64) -> Self {
        Self(clamp_level(level))
    }
}

// ============================================================================
// Mute and input
// ============================================================================

/// Built-in speaker mute state
///
/// Carried on the wire as the tokens `on` (muted) and `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mute(pub bool);

impl Mute {
    pub fn new(muted: bool) -> Self {
        Self(muted)
    }

    pub fn token(&self) -> &'static str {
        if self.0 {
            "on"
        } else {
            "off"
        }
    }
}

impl Property for Mute {
    const KEY: &'static str = "mute";
    const FEATURE: Feature = Feature::Mute;

    fn decode(body: &str) -> Option<Self> {
        match body.trim() {
            "on" => Some(Self(true)),
            "off" => Some(Self(false)),
            _ => None,
        }
    }

    fn encode(&self) -> String {
        self.token().to_string()
    }

    fn project(snapshot: &DeviceSnapshot) -> Self {
        Self(snapshot.muted)
    }

    fn apply(self, snapshot: &mut DeviceSnapshot) -> bool {
        replace(&mut snapshot.muted, self.0)
    }
}

/// Device-native code of the selected input (e.g. "15" for HDMI 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSource(pub String);

impl InputSource {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Property for InputSource {
    const KEY: &'static str = "input_source";
    const FEATURE: Feature = Feature::InputSource;

    fn decode(body: &str) -> Option<Self> {
        Some(Self(body.trim().to_string()))
    }

    fn encode(&self) -> String {
        self.0.clone()
    }

    fn fallback() -> Option<Self> {
        Some(Self(DeviceSnapshot::DEFAULT_SOURCE.to_string()))
    }

    fn project(snapshot: &DeviceSnapshot) -> Self {
        Self(snapshot.source_code.clone())
    }

    fn apply(self, snapshot: &mut DeviceSnapshot) -> bool {
        replace(&mut snapshot.source_code, self.0)
    }
}
