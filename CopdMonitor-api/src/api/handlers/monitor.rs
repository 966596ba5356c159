use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument};

use copd_monitor_domain::auth::AuthenticatedUser;
use copd_monitor_domain::session::SessionSnapshot;

use crate::api::AppState;

/// Current device, vitals and analysis of the caller's session
#[utoipa::path(
    get,
    path = "/api/v1/monitor",
    responses(
        (status = 200, description = "Session snapshot", body = SessionSnapshot),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "monitor",
    security(("jwt_auth" = []))
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_monitor_snapshot(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<SessionSnapshot> {
    // A user without a session sees the initial state
    let snapshot = match state.sessions.existing(&user.user_id).await {
        Some(session) => session.snapshot(),
        None => SessionSnapshot::default(),
    };
    Json(snapshot)
}

/// End the caller's session: disconnect the device and drop the analysis
#[utoipa::path(
    delete,
    path = "/api/v1/monitor",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "monitor",
    security(("jwt_auth" = []))
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn close_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> StatusCode {
    if state.sessions.close(&user.user_id).await {
        info!("Monitoring session closed");
    }
    StatusCode::NO_CONTENT
}
