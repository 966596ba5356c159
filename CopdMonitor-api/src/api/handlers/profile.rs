use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{error, instrument};

use copd_monitor_domain::auth::AuthenticatedUser;
use copd_monitor_domain::entities::UserProfile;
use copd_monitor_domain::services::ProfileServiceError;

use crate::api::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::profile::CreateProfileRequest;

fn map_profile_error(err: ProfileServiceError) -> ErrorResponse {
    match err {
        ProfileServiceError::ValidationError(msg) => ErrorResponse::validation_error(&msg),
        ProfileServiceError::NotFound(_) => ErrorResponse::not_found("profile"),
        other => {
            error!("Profile operation failed: {}", other);
            ErrorResponse::internal_error()
        }
    }
}

/// The caller's profile; missing sections are filled with defaults
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "profile",
    security(("jwt_auth" = []))
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserProfile>, ErrorResponse> {
    state
        .profiles
        .load_profile(&user.user_id)
        .await
        .map(Json)
        .map_err(map_profile_error)
}

/// Save all profile sections; the profile must have been created
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UserProfile,
    responses(
        (status = 200, description = "Profile saved", body = UserProfile),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Profile not created yet", body = ErrorResponse)
    ),
    tag = "profile",
    security(("jwt_auth" = []))
)]
#[instrument(skip(state, user, profile), fields(user_id = %user.user_id))]
pub async fn save_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<UserProfile>, ErrorResponse> {
    state
        .profiles
        .save_profile(&user.user_id, profile)
        .await
        .map(Json)
        .map_err(map_profile_error)
}

/// Create the initial profile
#[utoipa::path(
    post,
    path = "/api/v1/profile",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = UserProfile),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "profile",
    security(("jwt_auth" = []))
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ErrorResponse> {
    let profile = state
        .profiles
        .create_profile(&user.user_id, &request.full_name, &request.email, request.emergency_contact)
        .await
        .map_err(map_profile_error)?;

    Ok((StatusCode::CREATED, Json(profile)))
}
