use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of a successful pairing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PairResponse {
    /// Advertised name of the paired device
    pub device_name: String,
}
