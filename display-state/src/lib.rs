//! State layer for BetterDisplay-controlled monitors
//!
//! Keeps the last known brightness, volume, mute state and input source of a
//! monitor, refreshes them from the control server in the background, and
//! applies writes optimistically.
//!
//! # Architecture
//!
//! ```text
//! Poller ──(interval / request)──> DeviceState::refresh ──> DisplayClient
//!                                        │
//!                                        └── watch<DeviceSnapshot> ──> views
//!
//! view write ──> DeviceState::set ──> cache + RefreshSignal::request
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use display_state::{refresh_channel, DeviceId, DeviceState, Poller, PollerConfig, Volume};
//!
//! let client = display_client::DisplayClient::new("http://localhost:55777")?;
//! let config = PollerConfig::default();
//! let (signal, requests) = refresh_channel();
//! let device = Arc::new(DeviceState::new(
//!     DeviceId::new("DELL U2720Q"),
//!     client,
//!     config.request_timeout,
//!     signal,
//! ));
//! let poller = Poller::start(Arc::clone(&device), requests, config);
//! poller.first_refresh().await?;
//!
//! device.set(Volume::new(0.3)).await;
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod model;
pub mod poller;
pub mod property;
pub mod refresh;

pub use config::PollerConfig;
pub use device::DeviceState;
pub use error::{Result, StateError};
pub use model::{DeviceId, DeviceSnapshot};
pub use poller::{Poller, PollerStats};
pub use property::{Brightness, InputSource, LevelProperty, Mute, Property, Volume};
pub use refresh::{refresh_channel, RefreshRequests, RefreshSignal};

pub use display_client::{ClientError, DisplayClient, Feature};
