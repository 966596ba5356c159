pub mod handlers;
pub mod routes;

use std::sync::Arc;

use axum::Router;

use copd_monitor_domain::health::{HealthServiceTrait, SessionHealthService};
use copd_monitor_domain::services::{HistoryService, ProfileService};
use copd_monitor_domain::session::SessionRegistry;

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub history: HistoryService,
    pub profiles: ProfileService,
    pub health: Arc<dyn HealthServiceTrait>,
}

impl AppState {
    /// Build the services around a session registry and its store
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        let store = sessions.store();
        Self {
            history: HistoryService::new(store.clone()),
            profiles: ProfileService::new(store),
            health: Arc::new(SessionHealthService::new(sessions.clone())),
            sessions,
        }
    }

    /// Replace the health service, e.g. with a mock
    pub fn with_health_service(mut self, health: Arc<dyn HealthServiceTrait>) -> Self {
        self.health = health;
        self
    }
}

/// Create the application router
pub fn create_application(state: AppState) -> Router {
    routes::create_app(state)
}
