//! Bluetooth LE platform backed by btleplug.
//!
//! There is no interactive chooser on a server, so `request_device` scans for
//! a fixed window and picks the first peripheral whose advertised name passes
//! the filters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Manager, Peripheral};
use futures::{future, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::platform::{DeviceLinkError, DevicePlatform, NotificationStream, PairedDevice};
use super::protocol::RequestDeviceOptions;

pub struct BlePlatform {
    scan_window: Duration,
}

impl BlePlatform {
    pub fn new(scan_window: Duration) -> Self {
        Self { scan_window }
    }
}

/// Devices are chosen by advertised name alone; the vitals service is only
/// looked up after connecting, so it need not be advertised.
fn scan_filter() -> ScanFilter {
    ScanFilter::default()
}

fn gatt(e: btleplug::Error) -> DeviceLinkError {
    DeviceLinkError::Gatt(e.to_string())
}

#[async_trait]
impl DevicePlatform for BlePlatform {
    async fn request_device(&self, options: &RequestDeviceOptions) -> Result<Arc<dyn PairedDevice>, DeviceLinkError> {
        let manager = Manager::new()
            .await
            .map_err(|e| DeviceLinkError::Unsupported(e.to_string()))?;
        let adapter = manager
            .adapters()
            .await
            .map_err(|e| DeviceLinkError::Unsupported(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| DeviceLinkError::Unsupported("no Bluetooth adapter found".to_string()))?;

        info!("Scanning for devices for {:?}", self.scan_window);
        adapter
            .start_scan(scan_filter())
            .await
            .map_err(gatt)?;
        tokio::time::sleep(self.scan_window).await;

        let peripherals = adapter.peripherals().await.map_err(gatt)?;
        if let Err(e) = adapter.stop_scan().await {
            warn!("Failed to stop scan: {}", e);
        }

        for peripheral in peripherals {
            let name = match peripheral.properties().await {
                Ok(Some(properties)) => properties.local_name,
                Ok(None) => None,
                Err(e) => {
                    debug!("Skipping peripheral without properties: {}", e);
                    None
                }
            };

            if let Some(name) = name.filter(|name| options.accepts(name)) {
                return Ok(Arc::new(BleDevice { name, peripheral }));
            }
        }

        Err(DeviceLinkError::Cancelled)
    }

    fn platform_name(&self) -> &'static str {
        "ble"
    }
}

struct BleDevice {
    name: String,
    peripheral: Peripheral,
}

#[async_trait]
impl PairedDevice for BleDevice {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn connect(&self) -> Result<(), DeviceLinkError> {
        self.peripheral
            .connect()
            .await
            .map_err(|e| DeviceLinkError::Connection(e.to_string()))?;
        self.peripheral.discover_services().await.map_err(gatt)
    }

    async fn subscribe(&self, service: Uuid, characteristic: Uuid) -> Result<NotificationStream, DeviceLinkError> {
        let target = self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == characteristic && c.service_uuid == service)
            .ok_or_else(|| DeviceLinkError::Gatt(format!("characteristic {} not found", characteristic)))?;

        self.peripheral.subscribe(&target).await.map_err(gatt)?;
        let notifications = self.peripheral.notifications().await.map_err(gatt)?;

        Ok(notifications
            .filter_map(move |n| future::ready((n.uuid == characteristic).then_some(n.value)))
            .boxed())
    }

    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn disconnect(&self) -> Result<(), DeviceLinkError> {
        self.peripheral
            .disconnect()
            .await
            .map_err(|e| DeviceLinkError::Connection(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_is_not_restricted_to_advertised_services() {
        assert!(scan_filter().services.is_empty());
    }
}
