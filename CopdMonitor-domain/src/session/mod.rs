//! Per-user monitoring session.
//!
//! A session wires one device link to an analysis debouncer and a persistence
//! relay, all fed from the link's reading channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use copd_monitor_data::store::DocumentStore;

use crate::device::{DeviceLink, DeviceLinkError, DevicePlatform, RequestDeviceOptions};
use crate::entities::{AnalysisResult, VitalsReading};
use crate::services::analysis::{AnalysisClient, AnalysisDebouncer};
use crate::services::relay::PersistenceRelay;

/// Everything the dashboard shows for a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub device_name: Option<String>,
    pub connected: bool,
    pub scanning: bool,
    pub vitals: Option<VitalsReading>,
    pub analysis: Option<AnalysisResult>,
    pub analysis_loading: bool,
}

pub struct MonitorSession {
    uid: String,
    link: DeviceLink,
    analysis: AnalysisDebouncer,
    relay: JoinHandle<()>,
}

impl MonitorSession {
    pub fn start(
        uid: &str,
        platform: Arc<dyn DevicePlatform>,
        options: RequestDeviceOptions,
        client: Arc<dyn AnalysisClient>,
        store: Arc<dyn DocumentStore>,
        debounce: Duration,
    ) -> Self {
        let link = DeviceLink::new(platform, options);
        let analysis = AnalysisDebouncer::spawn(client, link.readings(), debounce);
        let relay = PersistenceRelay::new(store).spawn(uid.to_string(), link.readings());

        info!("Started monitoring session for {}", uid);
        Self {
            uid: uid.to_string(),
            link,
            analysis,
            relay,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub async fn pair(&self) -> Result<String, DeviceLinkError> {
        self.link.pair().await
    }

    pub async fn disconnect(&self) {
        self.link.disconnect().await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let link = self.link.state();
        let analysis = self.analysis.current();

        SessionSnapshot {
            device_name: link.device_name,
            connected: link.connected,
            scanning: link.scanning,
            vitals: link.vitals,
            analysis: analysis.analysis,
            analysis_loading: analysis.loading,
        }
    }
}

impl Drop for MonitorSession {
    fn drop(&mut self) {
        self.relay.abort();
    }
}

/// Dependencies shared by every session
#[derive(Clone)]
pub struct SessionFactory {
    pub platform: Arc<dyn DevicePlatform>,
    pub options: RequestDeviceOptions,
    pub client: Arc<dyn AnalysisClient>,
    pub store: Arc<dyn DocumentStore>,
    pub debounce: Duration,
}

/// Sessions keyed by user id, created on first use
pub struct SessionRegistry {
    factory: SessionFactory,
    sessions: RwLock<HashMap<String, Arc<MonitorSession>>>,
}

impl SessionRegistry {
    pub fn new(factory: SessionFactory) -> Self {
        Self {
            factory,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// The user's session, started if it does not exist yet
    pub async fn session(&self, uid: &str) -> Arc<MonitorSession> {
        if let Some(session) = self.sessions.read().await.get(uid) {
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(uid.to_string())
            .or_insert_with(|| {
                let f = &self.factory;
                Arc::new(MonitorSession::start(
                    uid,
                    f.platform.clone(),
                    f.options.clone(),
                    f.client.clone(),
                    f.store.clone(),
                    f.debounce,
                ))
            })
            .clone()
    }

    /// Disconnect and forget the user's session, stopping its tasks.
    ///
    /// Returns false when the user had no session.
    pub async fn close(&self, uid: &str) -> bool {
        let removed = self.sessions.write().await.remove(uid);
        match removed {
            Some(session) => {
                session.disconnect().await;
                info!("Closed monitoring session for {}", uid);
                true
            }
            None => false,
        }
    }

    /// Existing session without starting one
    pub async fn existing(&self, uid: &str) -> Option<Arc<MonitorSession>> {
        self.sessions.read().await.get(uid).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn platform_name(&self) -> &'static str {
        self.factory.platform.platform_name()
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.factory.store.clone()
    }
}
