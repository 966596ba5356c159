use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the bearer scheme referenced by the protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Device link
        crate::api::handlers::device::pair_device,
        crate::api::handlers::device::disconnect_device,

        // Live monitor
        crate::api::handlers::monitor::get_monitor_snapshot,
        crate::api::handlers::monitor::close_session,

        // History
        crate::api::handlers::history::get_history,

        // Profile
        crate::api::handlers::profile::get_profile,
        crate::api::handlers::profile::save_profile,
        crate::api::handlers::profile::create_profile
    ),
    components(
        schemas(
            // Domain entities
            copd_monitor_domain::entities::VitalsReading,
            copd_monitor_domain::entities::AnalysisResult,
            copd_monitor_domain::entities::RiskLevel,
            copd_monitor_domain::entities::HistoryRecord,
            copd_monitor_domain::entities::HistoryStats,
            copd_monitor_domain::entities::VitalStatus,
            copd_monitor_domain::entities::UserProfile,
            copd_monitor_domain::entities::PersonalInfo,
            copd_monitor_domain::entities::MedicalInfo,
            copd_monitor_domain::entities::EmergencyContact,
            copd_monitor_domain::entities::EmergencyPreferences,
            copd_monitor_domain::session::SessionSnapshot,

            // API entities
            crate::entities::common::ErrorResponse,
            crate::entities::device::PairResponse,
            crate::entities::history::HistoryEntry,
            crate::entities::history::VitalStatuses,
            crate::entities::history::HistoryResponse,
            crate::entities::profile::CreateProfileRequest,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "device", description = "Wearable pairing"),
        (name = "monitor", description = "Live vitals and analysis"),
        (name = "history", description = "Stored readings and statistics"),
        (name = "profile", description = "User profile management")
    ),
    info(
        title = "COPD Monitor API",
        version = "0.1.0",
        description = "Respiratory monitoring with wearable vitals and remote risk analysis",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "COPD Monitor API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags should be defined");
        assert!(tags.iter().any(|tag| tag.name == "device"));
        assert!(tags.iter().any(|tag| tag.name == "profile"));

        let paths = &openapi.paths.paths;
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/v1/device/pair"));
        assert!(paths.contains_key("/api/v1/device/disconnect"));
        assert!(paths.contains_key("/api/v1/monitor"));
        assert!(paths.contains_key("/api/v1/history"));
        assert!(paths.contains_key("/api/v1/profile"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components should be defined");
        assert!(components.security_schemes.contains_key("jwt_auth"));
    }
}
