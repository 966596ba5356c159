use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument, warn};

use copd_monitor_domain::auth::AuthenticatedUser;
use copd_monitor_domain::device::DeviceLinkError;

use crate::api::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::device::PairResponse;

fn map_link_error(err: DeviceLinkError) -> ErrorResponse {
    match err {
        DeviceLinkError::Unsupported(msg) => ErrorResponse::unsupported(&msg),
        DeviceLinkError::Cancelled => ErrorResponse::cancelled(),
        DeviceLinkError::Connection(msg) | DeviceLinkError::Gatt(msg) => ErrorResponse::device_error(&msg),
    }
}

/// Pair with a wearable and start streaming its vitals
#[utoipa::path(
    post,
    path = "/api/v1/device/pair",
    responses(
        (status = 200, description = "Device paired", body = PairResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "No device was selected", body = ErrorResponse),
        (status = 501, description = "Pairing not supported", body = ErrorResponse),
        (status = 502, description = "Device connection failed", body = ErrorResponse)
    ),
    tag = "device",
    security(("jwt_auth" = []))
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn pair_device(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<PairResponse>, ErrorResponse> {
    let session = state.sessions.session(&user.user_id).await;

    match session.pair().await {
        Ok(device_name) => {
            info!("Paired with {}", device_name);
            Ok(Json(PairResponse { device_name }))
        }
        Err(e) => {
            warn!("Pairing failed: {}", e);
            Err(map_link_error(e))
        }
    }
}

/// Disconnect the wearable and clear the live vitals
#[utoipa::path(
    post,
    path = "/api/v1/device/disconnect",
    responses(
        (status = 204, description = "Device disconnected"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "device",
    security(("jwt_auth" = []))
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn disconnect_device(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> StatusCode {
    if let Some(session) = state.sessions.existing(&user.user_id).await {
        session.disconnect().await;
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_link_errors_map_to_statuses() {
        assert_eq!(map_link_error(DeviceLinkError::Cancelled).status(), StatusCode::CONFLICT);
        assert_eq!(
            map_link_error(DeviceLinkError::Unsupported("no adapter".to_string())).status(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            map_link_error(DeviceLinkError::Gatt("gone".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
