// Testing utilities for the domain layer
// Available in unit tests and to downstream crates with the "mock" feature

pub use copd_monitor_data::store::mock::FaultyDocumentStore;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::entities::{AnalysisResult, RiskLevel, VitalsReading};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::analysis::{AnalysisClient, AnalysisError};

/// Analysis client answering every request with the same result, or failing
pub struct StaticAnalysisClient {
    response: Option<AnalysisResult>,
    calls: Mutex<Vec<VitalsReading>>,
}

impl StaticAnalysisClient {
    pub fn new(response: AnalysisResult) -> Self {
        Self {
            response: Some(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Low risk, no insights
    pub fn low_risk() -> Self {
        Self::new(AnalysisResult {
            risk_level: RiskLevel::Low,
            insights: vec!["Vitals within expected range".to_string()],
            recommendations: vec![],
        })
    }

    /// Every request fails as if the endpoint were down
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Readings analysed so far
    pub fn calls(&self) -> Vec<VitalsReading> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AnalysisClient for StaticAnalysisClient {
    async fn analyze(&self, reading: &VitalsReading) -> Result<AnalysisResult, AnalysisError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(*reading);
        }
        self.response
            .clone()
            .ok_or_else(|| AnalysisError::Transport("static client configured to fail".to_string()))
    }
}

/// Mock implementation of the HealthServiceTrait for testing
pub struct MockHealthService {
    /// Store component status
    store_status: ComponentStatus,
    /// System status
    system_status: SystemStatus,
    /// Additional components
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            store_status: ComponentStatus::Healthy,
            system_status: SystemStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with an unhealthy store
    pub fn with_unhealthy_store(mut self) -> Self {
        self.store_status = ComponentStatus::Unhealthy;
        self.system_status = SystemStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();
        components.insert(
            "store".to_string(),
            HealthComponent {
                status: self.store_status.clone(),
                details: None,
            },
        );

        SystemHealth {
            status: self.system_status.clone(),
            components,
        }
    }
}
