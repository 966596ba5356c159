//! Runtime configuration read from the environment (optionally a `.env` file).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use copd_monitor_domain::device::protocol::{default_filters, parse_filters, DeviceFilter};
use copd_monitor_domain::services::analysis::DEFAULT_ANALYSIS_PATH;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Where documents are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

/// Which platform devices are paired through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceBackend {
    Simulated,
    Ble,
}

impl FromStr for DeviceBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simulated" => Ok(DeviceBackend::Simulated),
            "ble" => Ok(DeviceBackend::Ble),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub store_backend: StoreBackend,
    pub analysis_base_url: String,
    pub analysis_path: String,
    pub analysis_debounce: Duration,
    pub device_backend: DeviceBackend,
    pub device_filters: Vec<DeviceFilter>,
    pub scan_window: Duration,
    pub simulated_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: PathBuf::from("data"),
            store_backend: StoreBackend::Sqlite,
            analysis_base_url: "http://127.0.0.1:8000".to_string(),
            analysis_path: DEFAULT_ANALYSIS_PATH.to_string(),
            analysis_debounce: Duration::from_millis(1000),
            device_backend: DeviceBackend::Simulated,
            device_filters: default_filters(),
            scan_window: Duration::from_secs(5),
            simulated_interval: Duration::from_millis(1000),
        }
    }
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Read every setting, falling back to defaults for unset variables.
    ///
    /// A variable that is set but does not parse is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let device_filters = match std::env::var("DEVICE_NAME_FILTERS") {
            Ok(raw) => parse_filters(&raw).map_err(|_| ConfigError::InvalidValue {
                name: "DEVICE_NAME_FILTERS",
                value: raw.clone(),
            })?,
            Err(_) => defaults.device_filters,
        };

        Ok(Self {
            port: parsed("PORT", defaults.port)?,
            data_dir: std::env::var("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            store_backend: parsed("STORE_BACKEND", defaults.store_backend)?,
            analysis_base_url: std::env::var("ANALYSIS_BASE_URL").unwrap_or(defaults.analysis_base_url),
            analysis_path: std::env::var("ANALYSIS_PATH").unwrap_or(defaults.analysis_path),
            analysis_debounce: Duration::from_millis(parsed("ANALYSIS_DEBOUNCE_MS", 1000u64)?),
            device_backend: parsed("DEVICE_BACKEND", defaults.device_backend)?,
            device_filters,
            scan_window: Duration::from_secs(parsed("DEVICE_SCAN_SECS", 5u64)?),
            simulated_interval: Duration::from_millis(parsed("SIMULATED_INTERVAL_MS", 1000u64)?),
        })
    }

    /// SQLite file used when `DB_SQLITE_PATH` is not set
    pub fn default_sqlite_path(&self) -> PathBuf {
        self.data_dir.join("copd_monitor.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        assert_eq!("SQLite".parse::<StoreBackend>(), Ok(StoreBackend::Sqlite));
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("postgres".parse::<StoreBackend>().is_err());
        assert_eq!("ble".parse::<DeviceBackend>(), Ok(DeviceBackend::Ble));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.analysis_debounce, Duration::from_millis(1000));
        assert_eq!(config.device_filters.len(), 3);
        assert_eq!(config.default_sqlite_path(), PathBuf::from("data/copd_monitor.db"));
    }

    #[test]
    fn test_invalid_number_is_reported() {
        std::env::set_var("SIMULATED_INTERVAL_MS", "soon");
        let result = AppConfig::from_env();
        std::env::remove_var("SIMULATED_INTERVAL_MS");

        match result {
            Err(ConfigError::InvalidValue { name, .. }) => assert_eq!(name, "SIMULATED_INTERVAL_MS"),
            other => panic!("expected invalid value, got {:?}", other),
        }
    }
}
