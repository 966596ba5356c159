use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::VitalsReading;
use super::platform::{DeviceLinkError, DevicePlatform, NotificationStream, PairedDevice};
use super::protocol::{decode_vitals, RequestDeviceOptions};

/// Capacity of the reading fan-out; slow subscribers skip the oldest readings
const READING_CHANNEL_CAPACITY: usize = 64;

/// Observable state of the device link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LinkState {
    /// Name of the chosen device
    pub device_name: Option<String>,

    /// Whether the device is connected
    pub connected: bool,

    /// True only while a pairing request is outstanding
    pub scanning: bool,

    /// Latest decoded reading
    pub vitals: Option<VitalsReading>,
}

struct ActiveDevice {
    device: Arc<dyn PairedDevice>,
    notifications: Option<JoinHandle<()>>,
}

/// Owns the connection to one wearable and publishes its readings.
///
/// Every decoded reading is published as `Some(reading)` on the reading
/// channel; a disconnect publishes `None` so subscribers can drop pending work.
pub struct DeviceLink {
    platform: Arc<dyn DevicePlatform>,
    options: RequestDeviceOptions,
    state: Arc<watch::Sender<LinkState>>,
    readings: broadcast::Sender<Option<VitalsReading>>,
    active: Mutex<Option<ActiveDevice>>,
}

impl DeviceLink {
    pub fn new(platform: Arc<dyn DevicePlatform>, options: RequestDeviceOptions) -> Self {
        let (state, _) = watch::channel(LinkState::default());
        let (readings, _) = broadcast::channel(READING_CHANNEL_CAPACITY);

        Self {
            platform,
            options,
            state: Arc::new(state),
            readings,
            active: Mutex::new(None),
        }
    }

    /// Snapshot of the current link state
    pub fn state(&self) -> LinkState {
        self.state.borrow().clone()
    }

    /// Receiver for decoded readings, `None` on disconnect
    pub fn readings(&self) -> broadcast::Receiver<Option<VitalsReading>> {
        self.readings.subscribe()
    }

    pub fn platform_name(&self) -> &'static str {
        self.platform.platform_name()
    }

    /// Pair with a device, connect and start the vitals notifications.
    ///
    /// A previously paired device is released and the link state reset
    /// before the new request, so a failed pairing leaves the link empty.
    /// The device lock is not held while the platform chooses a device.
    /// Returns the chosen device's name.
    pub async fn pair(&self) -> Result<String, DeviceLinkError> {
        let previous = self.active.lock().await.take();
        if let Some(previous) = previous {
            debug!("Releasing previously paired device before pairing again");
            self.release(previous).await;
            self.reset();
        }

        self.state.send_modify(|state| state.scanning = true);
        let requested = self.platform.request_device(&self.options).await;
        self.state.send_modify(|state| state.scanning = false);

        let device = match requested {
            Ok(device) => device,
            Err(e) => {
                error!("Bluetooth scan error: {}", e);
                return Err(e);
            }
        };

        let name = device.name();
        info!("Selected device {} on {}", name, self.platform.platform_name());
        self.state.send_modify(|state| state.device_name = Some(name.clone()));

        if let Err(e) = device.connect().await {
            error!("Connection error for {}: {}", name, e);
            self.state.send_replace(LinkState::default());
            return Err(e);
        }
        self.state.send_modify(|state| state.connected = true);

        // A failed subscription leaves the device connected without data
        let notifications = match device
            .subscribe(self.options.service, self.options.characteristic)
            .await
        {
            Ok(stream) => Some(tokio::spawn(pump_notifications(
                stream,
                self.state.clone(),
                self.readings.clone(),
            ))),
            Err(e) => {
                error!("Data stream error for {}: {}", name, e);
                None
            }
        };

        let mut active = self.active.lock().await;
        // A concurrent pairing may have installed its device meanwhile
        if let Some(other) = active.replace(ActiveDevice { device, notifications }) {
            self.release(other).await;
        }
        Ok(name)
    }

    /// Stop notifications, disconnect the device and reset the link state
    pub async fn disconnect(&self) {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            self.release(previous).await;
        }

        self.reset();
        info!("Device link reset");
    }

    fn reset(&self) {
        self.state.send_replace(LinkState::default());
        // No receivers is not an error here
        let _ = self.readings.send(None);
    }

    async fn release(&self, active: ActiveDevice) {
        if let Some(task) = active.notifications {
            task.abort();
            // Wait for the task so no reading lands after the reset
            let _ = task.await;
        }

        if active.device.is_connected().await {
            if let Err(e) = active.device.disconnect().await {
                warn!("Failed to disconnect {}: {}", active.device.name(), e);
            }
        }
    }
}

async fn pump_notifications(
    mut stream: NotificationStream,
    state: Arc<watch::Sender<LinkState>>,
    readings: broadcast::Sender<Option<VitalsReading>>,
) {
    while let Some(payload) = stream.next().await {
        match decode_vitals(&payload, Utc::now()) {
            Ok(reading) => {
                debug!(
                    heart_rate = reading.heart_rate,
                    spo2 = reading.spo2,
                    respiration = reading.respiration_rate,
                    "Received vitals"
                );
                state.send_modify(|state| state.vitals = Some(reading));
                let _ = readings.send(Some(reading));
            }
            Err(e) => warn!("Dropping notification: {}", e),
        }
    }
    debug!("Notification stream ended");
}
