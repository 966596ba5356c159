use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use copd_monitor_api::api::{create_application, AppState};
use copd_monitor_domain::auth::token::generate_token;
use copd_monitor_domain::device::protocol::RequestDeviceOptions;
use copd_monitor_domain::device::{SimulatedDevice, SimulatedPlatform};
use copd_monitor_domain::entities::VitalsReading;
use copd_monitor_domain::services::PersistenceRelay;
use copd_monitor_domain::session::{SessionFactory, SessionRegistry};
use copd_monitor_domain::store::InMemoryDocumentStore;
use copd_monitor_domain::testing::{MockHealthService, StaticAnalysisClient};

const USER: &str = "patient-42";

fn setup_test_env() {
    std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_only");
    std::env::set_var("JWT_ISSUER", "test-issuer");
    std::env::remove_var("BYPASS_AUTH");
}

struct TestApp {
    state: AppState,
    store: Arc<InMemoryDocumentStore>,
    device: Arc<SimulatedDevice>,
    token: String,
}

impl TestApp {
    fn new() -> Self {
        Self::with_device(SimulatedDevice::new("COPD-Band"))
    }

    fn with_device(device: SimulatedDevice) -> Self {
        setup_test_env();

        let store = Arc::new(InMemoryDocumentStore::new());
        let device = Arc::new(device);
        let factory = SessionFactory {
            platform: Arc::new(SimulatedPlatform::new().with_device(device.clone())),
            options: RequestDeviceOptions::default(),
            client: Arc::new(StaticAnalysisClient::low_risk()),
            store: store.clone(),
            debounce: Duration::from_millis(20),
        };
        let state = AppState::new(Arc::new(SessionRegistry::new(factory)));
        let token = generate_token(USER).expect("token should be generated");

        Self { state, store, device, token }
    }

    fn router(&self) -> Router {
        create_application(self.state.clone())
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token));

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

#[tokio::test]
async fn test_health_check_is_public() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["components"]["store"]["status"], "ok");
    assert_eq!(json["components"]["device"]["status"], "ok");
}

#[tokio::test]
async fn test_health_check_reports_unhealthy_store() {
    let app = TestApp::new();
    let state = app
        .state
        .clone()
        .with_health_service(Arc::new(MockHealthService::new().with_unhealthy_store()));

    let response = create_application(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    for uri in ["/api/v1/monitor", "/api/v1/history", "/api/v1/profile"] {
        let response = app
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} should be protected", uri);
    }

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/monitor")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_monitor_starts_empty() {
    let app = TestApp::new();

    let (status, json) = app.send(Method::GET, "/api/v1/monitor", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["connected"], false);
    assert_eq!(json["scanning"], false);
    assert!(json["vitals"].is_null());
    assert!(json["analysis"].is_null());
}

#[tokio::test]
async fn test_pair_stream_and_disconnect() {
    let app = TestApp::new();

    let (status, json) = app.send(Method::POST, "/api/v1/device/pair", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deviceName"], "COPD-Band");

    assert!(app.device.notify(&[72, 95, 18]));
    tokio::time::sleep(Duration::from_millis(300)).await;

    let (status, json) = app.send(Method::GET, "/api/v1/monitor", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["connected"], true);
    assert_eq!(json["deviceName"], "COPD-Band");
    assert_eq!(json["vitals"]["heartRate"], 72);
    assert_eq!(json["vitals"]["spO2"], 95);
    assert_eq!(json["vitals"]["respiration"], 18);
    assert_eq!(json["analysis"]["riskLevel"], "low");

    // The reading was relayed to both locations
    let (_, history) = app.send(Method::GET, "/api/v1/history", None).await;
    assert_eq!(history["records"].as_array().unwrap().len(), 1);
    assert!(app.store.len() >= 2);

    let (status, _) = app.send(Method::POST, "/api/v1/device/disconnect", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, json) = app.send(Method::GET, "/api/v1/monitor", None).await;
    assert_eq!(json["connected"], false);
    assert!(json["deviceName"].is_null());
    assert!(json["vitals"].is_null());
}

#[tokio::test]
async fn test_pair_without_matching_device_is_cancelled() {
    let app = TestApp::with_device(SimulatedDevice::new("Kitchen Scale"));

    let (status, json) = app.send(Method::POST, "/api/v1/device/pair", None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "cancelled");
}

#[tokio::test]
async fn test_pair_connection_failure() {
    let app = TestApp::with_device(SimulatedDevice::new("COPD-Band").failing_connect());

    let (status, json) = app.send(Method::POST, "/api/v1/device/pair", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "device_error");
}

#[tokio::test]
async fn test_history_with_stats_and_classification() {
    let app = TestApp::new();

    let (status, json) = app.send(Method::GET, "/api/v1/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["records"].as_array().unwrap().is_empty());
    assert!(json["stats"].is_null());

    let relay = PersistenceRelay::new(app.store.clone());
    relay.persist(USER, &VitalsReading::new(70, 97, 16, Utc::now())).await;
    relay.persist(USER, &VitalsReading::new(110, 89, 26, Utc::now())).await;

    let (status, json) = app.send(Method::GET, "/api/v1/history?limit=10", None).await;
    assert_eq!(status, StatusCode::OK);

    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    for record in records {
        assert!(record["id"].is_string());
        assert!(record["status"]["heartRate"].is_string());
    }
    assert_eq!(json["stats"]["avgHeartRate"], 90);
    assert_eq!(json["stats"]["avgSpO2"], 93);
    assert_eq!(json["stats"]["avgRespiration"], 21);
    assert_eq!(json["stats"]["totalReadings"], 2);
}

#[tokio::test]
async fn test_history_rejects_zero_limit() {
    let app = TestApp::new();

    let (status, json) = app.send(Method::GET, "/api/v1/history?limit=0", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let app = TestApp::new();

    // Missing profile reads as defaults
    let (status, json) = app.send(Method::GET, "/api/v1/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["personalInfo"]["fullName"], "");
    assert_eq!(json["emergencyPreferences"]["autoAlert"], true);

    let mut profile = json.clone();
    profile["personalInfo"]["fullName"] = json!("Ada Lovelace");

    // Saving requires an existing document
    let (status, json) = app.send(Method::PUT, "/api/v1/profile", Some(profile.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");

    let (status, json) = app
        .send(
            Method::POST,
            "/api/v1/profile",
            Some(json!({
                "fullName": "Ada",
                "email": "ada@example.com",
                "emergencyContact": { "name": "Charles", "phone": "555-0100" }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["personalInfo"]["email"], "ada@example.com");

    let (status, _) = app.send(Method::PUT, "/api/v1/profile", Some(profile)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app.send(Method::GET, "/api/v1/profile", None).await;
    assert_eq!(json["personalInfo"]["fullName"], "Ada Lovelace");
}

#[tokio::test]
async fn test_profile_validation_error() {
    let app = TestApp::new();

    let (status, json) = app
        .send(
            Method::POST,
            "/api/v1/profile",
            Some(json!({ "fullName": "x".repeat(201), "email": "a@example.com" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"].as_str().unwrap().contains("personal_info.full_name"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["info"]["title"], "COPD Monitor API");
    assert!(json["paths"]["/api/v1/device/pair"].is_object());
}

#[tokio::test]
async fn test_close_session_releases_it() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::POST, "/api/v1/device/pair", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.state.sessions.len().await, 1);

    let (status, _) = app.send(Method::DELETE, "/api/v1/monitor", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.state.sessions.is_empty().await);
    assert!(!app.device.is_connected_now());

    let (_, json) = app.send(Method::GET, "/api/v1/monitor", None).await;
    assert_eq!(json["connected"], false);
    assert!(json["analysis"].is_null());

    // Closing again is harmless
    let (status, _) = app.send(Method::DELETE, "/api/v1/monitor", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
