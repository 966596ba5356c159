//! Wiring of the configured backends into an [`AppState`].

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use copd_monitor_data::store::{DocumentStore, InMemoryDocumentStore};
use copd_monitor_domain::device::protocol::RequestDeviceOptions;
use copd_monitor_domain::device::{DevicePlatform, SimulatedDevice, SimulatedPlatform};
use copd_monitor_domain::services::HttpAnalysisClient;
use copd_monitor_domain::session::{SessionFactory, SessionRegistry};

use crate::api::AppState;
use crate::config::{AppConfig, DeviceBackend, StoreBackend};

/// Name the simulated wearable advertises
pub const SIMULATED_DEVICE_NAME: &str = "COPD-Simulator";

/// Open the configured document store
pub fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        StoreBackend::Sqlite => open_sqlite_store(config),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    use copd_monitor_data::database::{get_connection_info, get_db_pool, initialize_database_pool};
    use copd_monitor_data::store::SqliteDocumentStore;

    // Set DB_SQLITE_PATH environment variable if not already set
    if std::env::var("DB_SQLITE_PATH").is_err() {
        let db_path = config.default_sqlite_path();
        std::env::set_var("DB_SQLITE_PATH", db_path.to_string_lossy().to_string());
        info!("Set DB_SQLITE_PATH to {}", db_path.display());
    }

    initialize_database_pool().context("failed to initialize database pool")?;
    let pool = get_db_pool().context("database pool unavailable")?;

    if let Some(description) = get_connection_info() {
        info!("{}", description);
    }

    Ok(Arc::new(SqliteDocumentStore::new(pool)))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite_store(_config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    anyhow::bail!("STORE_BACKEND=sqlite requires the sqlite feature")
}

/// Select the platform devices are paired through
pub fn build_platform(config: &AppConfig) -> anyhow::Result<Arc<dyn DevicePlatform>> {
    match config.device_backend {
        DeviceBackend::Simulated => {
            info!(
                "Using simulated device '{}' emitting every {:?}",
                SIMULATED_DEVICE_NAME, config.simulated_interval
            );
            let device = SimulatedDevice::new(SIMULATED_DEVICE_NAME).generating(config.simulated_interval);
            Ok(Arc::new(SimulatedPlatform::new().with_device(Arc::new(device))))
        }
        DeviceBackend::Ble => open_ble_platform(config),
    }
}

#[cfg(feature = "ble")]
fn open_ble_platform(config: &AppConfig) -> anyhow::Result<Arc<dyn DevicePlatform>> {
    use copd_monitor_domain::device::BlePlatform;

    info!("Using Bluetooth LE adapter, scan window {:?}", config.scan_window);
    Ok(Arc::new(BlePlatform::new(config.scan_window)))
}

#[cfg(not(feature = "ble"))]
fn open_ble_platform(_config: &AppConfig) -> anyhow::Result<Arc<dyn DevicePlatform>> {
    anyhow::bail!("DEVICE_BACKEND=ble requires the ble feature")
}

/// Build the whole application state from configuration
pub fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store = build_store(config)?;
    let platform = build_platform(config)?;

    let client = HttpAnalysisClient::new(&config.analysis_base_url, &config.analysis_path);
    info!("Remote analysis endpoint: {}", client.endpoint());

    let factory = SessionFactory {
        platform,
        options: RequestDeviceOptions::with_filters(config.device_filters.clone()),
        client: Arc::new(client),
        store,
        debounce: config.analysis_debounce,
    };

    Ok(AppState::new(Arc::new(SessionRegistry::new(factory))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> AppConfig {
        AppConfig {
            store_backend: StoreBackend::Memory,
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_build_state_with_memory_store() {
        let state = build_state(&memory_config()).expect("state should build");

        assert_eq!(state.sessions.platform_name(), "simulated");
        assert!(state.sessions.is_empty().await);
    }

    #[cfg(not(feature = "ble"))]
    #[test]
    fn test_ble_backend_requires_feature() {
        let config = AppConfig {
            device_backend: DeviceBackend::Ble,
            ..memory_config()
        };
        assert!(build_platform(&config).is_err());
    }
}
