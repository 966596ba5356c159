use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use copd_monitor_domain::auth::auth_middleware;

use crate::api::handlers::{device, health, history, monitor, profile};
use crate::api::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    // Routes acting on the caller's own session and documents
    let api_routes = Router::new()
        .route("/device/pair", post(device::pair_device))
        .route("/device/disconnect", post(device::disconnect_device))
        .route(
            "/monitor",
            get(monitor::get_monitor_snapshot).delete(monitor::close_session),
        )
        .route("/history", get(history::get_history))
        .route(
            "/profile",
            get(profile::get_profile)
                .put(profile::save_profile)
                .post(profile::create_profile),
        )
        .layer(middleware::from_fn(auth_middleware));

    debug!("API routes configured");

    let public_routes = Router::new().route("/health", get(health::health_check));

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .with_state(state)
        .merge(configure_swagger_routes());

    debug!("Swagger UI merged");

    health::initialize_server_start_time();

    configure_security(app).layer(TraceLayer::new_for_http())
}

/// CORS and security headers for every response
pub fn configure_security(app: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    app.layer(cors).layer(security_headers)
}
