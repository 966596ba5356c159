use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::vitals::VitalsReading;

/// One entry of a user's vitals history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Generated entry id
    pub id: String,

    /// The stored reading
    #[serde(flatten)]
    pub reading: VitalsReading,

    /// When the entry was written
    pub created_at: DateTime<Utc>,
}

/// Summary statistics over a set of history entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    /// Mean heart rate, rounded to the nearest integer
    pub avg_heart_rate: u16,

    /// Mean oxygen saturation, rounded to the nearest integer
    #[serde(rename = "avgSpO2")]
    pub avg_spo2: u16,

    /// Mean respiration rate, rounded to the nearest integer
    pub avg_respiration: u16,

    /// Write time of the newest entry
    pub last_check: DateTime<Utc>,

    /// Number of entries summarised
    pub total_readings: usize,
}

/// Which vital a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum VitalKind {
    HeartRate,
    #[serde(rename = "spO2")]
    SpO2,
    Respiration,
}

/// Display classification of a single vital value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum VitalStatus {
    Normal,
    Warning,
    Critical,
}
