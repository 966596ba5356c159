//! Domain layer health check functionality
//! Reports the state of the document store and the device platform

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use copd_monitor_data::store::{layout, DocumentStore};

use crate::session::SessionRegistry;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced performance
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;
}

/// Probe the document store with a read of a path that never exists
pub async fn check_store_status(store: &dyn DocumentStore) -> Result<(), String> {
    let probe = layout::latest_reading("health-probe").map_err(|e| e.to_string())?;
    store.get(&probe).await.map(|_| ()).map_err(|e| {
        warn!("Document store health probe failed: {}", e);
        format!("{} store error: {}", store.backend_name(), e)
    })
}

/// Health of the store and device platform backing the sessions
pub struct SessionHealthService {
    registry: Arc<SessionRegistry>,
}

impl SessionHealthService {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl HealthServiceTrait for SessionHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let store = self.registry.store();
        let store_component = match check_store_status(store.as_ref()).await {
            Ok(()) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(format!("backend: {}", store.backend_name())),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let device_component = HealthComponent {
            status: ComponentStatus::Healthy,
            details: Some(format!(
                "platform: {}, sessions: {}",
                self.registry.platform_name(),
                self.registry.len().await
            )),
        };

        let overall_status = if store_component.status == ComponentStatus::Unhealthy {
            SystemStatus::Unhealthy
        } else if store_component.status == ComponentStatus::Degraded {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        SystemHealth {
            status: overall_status,
            components: vec![
                ("store".to_string(), store_component),
                ("device".to_string(), device_component),
            ].into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{RequestDeviceOptions, SimulatedPlatform};
    use crate::session::SessionFactory;
    use crate::testing::StaticAnalysisClient;
    use copd_monitor_data::store::InMemoryDocumentStore;
    use std::time::Duration;

    #[tokio::test]
    async fn test_get_system_health() {
        let registry = Arc::new(SessionRegistry::new(SessionFactory {
            platform: Arc::new(SimulatedPlatform::new()),
            options: RequestDeviceOptions::default(),
            client: Arc::new(StaticAnalysisClient::low_risk()),
            store: Arc::new(InMemoryDocumentStore::new()),
            debounce: Duration::from_millis(1000),
        }));

        let health = SessionHealthService::new(registry).get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.components.contains_key("store"));
        let device = &health.components["device"];
        assert_eq!(device.details.as_deref(), Some("platform: simulated, sessions: 0"));
    }
}
