use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use uuid::Uuid;

use super::protocol::RequestDeviceOptions;

/// Errors surfaced by pairing and the link to a device
#[derive(Debug, Error)]
pub enum DeviceLinkError {
    /// No pairing-capable platform or adapter is available
    #[error("Device pairing not supported: {0}")]
    Unsupported(String),

    /// Nothing was picked in the device chooser
    #[error("Device selection cancelled")]
    Cancelled,

    /// The device was picked but the connection failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Service discovery or subscription failed
    #[error("GATT error: {0}")]
    Gatt(String),
}

/// Raw notification payloads of a subscribed characteristic
pub type NotificationStream = BoxStream<'static, Vec<u8>>;

/// A device returned by the platform chooser
#[async_trait]
pub trait PairedDevice: Send + Sync {
    /// Advertised name
    fn name(&self) -> String;

    async fn connect(&self) -> Result<(), DeviceLinkError>;

    /// Start notifications on a characteristic; the stream ends when the device goes away
    async fn subscribe(&self, service: Uuid, characteristic: Uuid) -> Result<NotificationStream, DeviceLinkError>;

    async fn is_connected(&self) -> bool;

    async fn disconnect(&self) -> Result<(), DeviceLinkError>;
}

/// Source of pairable devices
#[async_trait]
pub trait DevicePlatform: Send + Sync {
    /// Let the user (or a scan) choose one device matching the options
    async fn request_device(&self, options: &RequestDeviceOptions) -> Result<Arc<dyn PairedDevice>, DeviceLinkError>;

    /// Short platform name for logs and health reporting
    fn platform_name(&self) -> &'static str;
}
