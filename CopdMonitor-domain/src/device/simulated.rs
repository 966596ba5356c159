//! In-process device platform.
//!
//! Used by tests to drive notifications by hand, and by the `simulated`
//! device backend which emits synthetic vitals on an interval.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use super::platform::{DeviceLinkError, DevicePlatform, NotificationStream, PairedDevice};
use super::protocol::{encode_vitals, RequestDeviceOptions, HEART_RATE_MEASUREMENT, HEART_RATE_SERVICE};

/// Platform that offers a fixed list of simulated devices
#[derive(Default)]
pub struct SimulatedPlatform {
    devices: Vec<Arc<SimulatedDevice>>,
    unsupported: bool,
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform without pairing support
    pub fn unsupported() -> Self {
        Self {
            devices: Vec::new(),
            unsupported: true,
        }
    }

    pub fn with_device(mut self, device: Arc<SimulatedDevice>) -> Self {
        self.devices.push(device);
        self
    }
}

#[async_trait]
impl DevicePlatform for SimulatedPlatform {
    async fn request_device(&self, options: &RequestDeviceOptions) -> Result<Arc<dyn PairedDevice>, DeviceLinkError> {
        if self.unsupported {
            return Err(DeviceLinkError::Unsupported("simulated platform has no adapter".to_string()));
        }

        // The first accepted device stands in for the user's pick
        self.devices
            .iter()
            .find(|device| options.accepts(&device.name))
            .map(|device| device.clone() as Arc<dyn PairedDevice>)
            .ok_or(DeviceLinkError::Cancelled)
    }

    fn platform_name(&self) -> &'static str {
        "simulated"
    }
}

/// A fake wearable exposing the heart rate characteristic
pub struct SimulatedDevice {
    name: String,
    connected: AtomicBool,
    fail_connect: bool,
    generate_every: Option<Duration>,
    subscriber: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    disconnect_calls: AtomicUsize,
}

impl SimulatedDevice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connected: AtomicBool::new(false),
            fail_connect: false,
            generate_every: None,
            subscriber: Mutex::new(None),
            disconnect_calls: AtomicUsize::new(0),
        }
    }

    /// Refuse every connection attempt
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Emit random plausible vitals at `interval` while subscribed
    pub fn generating(mut self, interval: Duration) -> Self {
        self.generate_every = Some(interval);
        self
    }

    /// Push one payload to the subscriber; false when nobody is subscribed
    pub fn notify(&self, payload: &[u8]) -> bool {
        match self.subscriber.lock() {
            Ok(subscriber) => subscriber
                .as_ref()
                .map(|tx| tx.unbounded_send(payload.to_vec()).is_ok())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    pub fn is_connected_now(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    fn set_subscriber(&self, tx: Option<mpsc::UnboundedSender<Vec<u8>>>) -> Result<(), DeviceLinkError> {
        let mut subscriber = self
            .subscriber
            .lock()
            .map_err(|e| DeviceLinkError::Gatt(e.to_string()))?;
        *subscriber = tx;
        Ok(())
    }
}

fn random_payload() -> Vec<u8> {
    let mut rng = rand::thread_rng();
    encode_vitals(rng.gen_range(60..=100), rng.gen_range(92..=99), rng.gen_range(12..=22))
}

#[async_trait]
impl PairedDevice for SimulatedDevice {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn connect(&self) -> Result<(), DeviceLinkError> {
        if self.fail_connect {
            return Err(DeviceLinkError::Connection(format!("{} refused the connection", self.name)));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&self, service: Uuid, characteristic: Uuid) -> Result<NotificationStream, DeviceLinkError> {
        if !self.is_connected_now() {
            return Err(DeviceLinkError::Gatt(format!("{} is not connected", self.name)));
        }
        if service != HEART_RATE_SERVICE || characteristic != HEART_RATE_MEASUREMENT {
            return Err(DeviceLinkError::Gatt(format!("characteristic {} not found", characteristic)));
        }

        let (tx, rx) = mpsc::unbounded();

        if let Some(interval) = self.generate_every {
            let generator = tx.clone();
            let name = self.name.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                loop {
                    ticker.tick().await;
                    if generator.unbounded_send(random_payload()).is_err() {
                        debug!("Stopping synthetic vitals for {}", name);
                        break;
                    }
                }
            });
        }

        self.set_subscriber(Some(tx))?;
        Ok(rx.boxed())
    }

    async fn is_connected(&self) -> bool {
        self.is_connected_now()
    }

    async fn disconnect(&self) -> Result<(), DeviceLinkError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        // Dropping the sender ends the notification stream
        self.set_subscriber(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_requires_connection() {
        let device = SimulatedDevice::new("ESP32");
        let result = device.subscribe(HEART_RATE_SERVICE, HEART_RATE_MEASUREMENT).await;
        assert!(matches!(result, Err(DeviceLinkError::Gatt(_))));
    }

    #[tokio::test]
    async fn test_unknown_characteristic_is_rejected() {
        let device = SimulatedDevice::new("ESP32");
        device.connect().await.unwrap();
        let result = device.subscribe(HEART_RATE_SERVICE, Uuid::nil()).await;
        assert!(matches!(result, Err(DeviceLinkError::Gatt(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_emits_decodable_payloads() {
        let device = SimulatedDevice::new("COPD-Sim").generating(Duration::from_millis(1000));
        device.connect().await.unwrap();

        let mut stream = device.subscribe(HEART_RATE_SERVICE, HEART_RATE_MEASUREMENT).await.unwrap();
        for _ in 0..3 {
            let payload = stream.next().await.unwrap();
            assert_eq!(payload.len(), 3);
            assert!((60..=100).contains(&payload[0]));
            assert!((92..=99).contains(&payload[1]));
            assert!((12..=22).contains(&payload[2]));
        }
    }

    #[tokio::test]
    async fn test_disconnect_ends_stream() {
        let device = SimulatedDevice::new("ESP32");
        device.connect().await.unwrap();
        let mut stream = device.subscribe(HEART_RATE_SERVICE, HEART_RATE_MEASUREMENT).await.unwrap();

        device.disconnect().await.unwrap();
        assert!(stream.next().await.is_none());
    }
}
