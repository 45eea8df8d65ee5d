//! Core data types

mod device_id;
mod snapshot;

pub use device_id::DeviceId;
pub use snapshot::DeviceSnapshot;
