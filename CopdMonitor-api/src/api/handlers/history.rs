use axum::{
    extract::{Query, State},
    Extension, Json,
};
use tracing::{error, info, instrument};

use copd_monitor_domain::auth::AuthenticatedUser;
use copd_monitor_domain::services::history::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use copd_monitor_domain::services::{compute_stats, HistoryServiceError};

use crate::api::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::history::{HistoryEntry, HistoryQueryParams, HistoryResponse};

/// Recent vitals history with summary statistics
#[utoipa::path(
    get,
    path = "/api/v1/history",
    params(HistoryQueryParams),
    responses(
        (status = 200, description = "Newest entries first", body = HistoryResponse),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "history",
    security(("jwt_auth" = []))
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<Json<HistoryResponse>, ErrorResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);

    let records = state
        .history
        .recent_history(&user.user_id, limit)
        .await
        .map_err(|e| match e {
            HistoryServiceError::InvalidLimit(_) => ErrorResponse::bad_request(&format!(
                "limit must be between 1 and {}",
                MAX_HISTORY_LIMIT
            )),
            HistoryServiceError::Store(e) => {
                error!("Error fetching health data: {}", e);
                ErrorResponse::internal_error()
            }
        })?;

    info!("Returning {} history entries", records.len());
    let stats = compute_stats(&records);

    Ok(Json(HistoryResponse {
        records: records.into_iter().map(HistoryEntry::from).collect(),
        stats,
    }))
}
