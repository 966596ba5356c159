use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use copd_monitor_domain::entities::{HistoryRecord, HistoryStats, VitalKind, VitalStatus};
use copd_monitor_domain::services::classify;

/// Query parameters for the history page
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct HistoryQueryParams {
    /// Maximum number of entries (default: 50, max: 500)
    pub limit: Option<usize>,
}

/// Display classification of each vital of an entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VitalStatuses {
    pub heart_rate: VitalStatus,
    #[serde(rename = "spO2")]
    pub spo2: VitalStatus,
    pub respiration: VitalStatus,
}

/// History entry with its classification
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: HistoryRecord,
    pub status: VitalStatuses,
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(record: HistoryRecord) -> Self {
        let status = VitalStatuses {
            heart_rate: classify(VitalKind::HeartRate, record.reading.heart_rate),
            spo2: classify(VitalKind::SpO2, record.reading.spo2),
            respiration: classify(VitalKind::Respiration, record.reading.respiration_rate),
        };
        Self { record, status }
    }
}

/// Newest entries first, with statistics over the returned entries
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub records: Vec<HistoryEntry>,
    /// Absent when there are no entries
    pub stats: Option<HistoryStats>,
}
