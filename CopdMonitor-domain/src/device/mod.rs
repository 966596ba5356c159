// Device link: pairing with the wearable and decoding its notifications
pub mod link;
pub mod platform;
pub mod protocol;
pub mod simulated;

#[cfg(feature = "ble")]
pub mod ble;

pub use link::{DeviceLink, LinkState};
pub use platform::{DeviceLinkError, DevicePlatform, NotificationStream, PairedDevice};
pub use protocol::{decode_vitals, parse_filters, DecodeError, DeviceFilter, RequestDeviceOptions};
pub use simulated::{SimulatedDevice, SimulatedPlatform};

#[cfg(feature = "ble")]
pub use ble::BlePlatform;
