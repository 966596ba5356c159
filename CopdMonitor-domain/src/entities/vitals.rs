use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// One sample of the wearable's vitals.
///
/// Produced once per device notification and never mutated afterwards. Values
/// are stored as received; physiological bounds are only applied when history
/// entries are classified for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct VitalsReading {
    /// Heart rate in beats per minute
    pub heart_rate: u16,

    /// Oxygen saturation in percent
    #[serde(rename = "spO2")]
    pub spo2: u16,

    /// Respiration rate in breaths per minute
    #[serde(rename = "respiration")]
    pub respiration_rate: u16,

    /// When the sample was decoded, as Unix epoch milliseconds on the wire
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    #[cfg_attr(feature = "with-api", schema(value_type = i64))]
    pub captured_at: DateTime<Utc>,
}

impl VitalsReading {
    pub fn new(heart_rate: u16, spo2: u16, respiration_rate: u16, captured_at: DateTime<Utc>) -> Self {
        Self {
            heart_rate,
            spo2,
            respiration_rate,
            captured_at,
        }
    }
}
