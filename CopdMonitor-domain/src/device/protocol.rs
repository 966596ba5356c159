//! Wire protocol of the wearable: which devices to offer, where the vitals
//! are published and how a notification payload maps to a reading.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::VitalsReading;

/// GATT Heart Rate service (0x180D)
pub const HEART_RATE_SERVICE: Uuid = Uuid::from_u128(0x0000180d_0000_1000_8000_00805f9b34fb);

/// GATT Heart Rate Measurement characteristic (0x2A37)
pub const HEART_RATE_MEASUREMENT: Uuid = Uuid::from_u128(0x00002a37_0000_1000_8000_00805f9b34fb);

/// Minimum payload length: heart rate, SpO2, respiration
pub const PAYLOAD_LEN: usize = 3;

/// Errors raised while turning a notification into a reading
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Notification payload too short: expected at least {PAYLOAD_LEN} bytes, got {0}")]
    Truncated(usize),
}

/// Decode one notification payload.
///
/// Byte 0 is heart rate, byte 1 oxygen saturation, byte 2 respiration rate.
/// Trailing bytes are ignored.
pub fn decode_vitals(payload: &[u8], captured_at: DateTime<Utc>) -> Result<VitalsReading, DecodeError> {
    match payload {
        [heart_rate, spo2, respiration, ..] => Ok(VitalsReading::new(
            u16::from(*heart_rate),
            u16::from(*spo2),
            u16::from(*respiration),
            captured_at,
        )),
        _ => Err(DecodeError::Truncated(payload.len())),
    }
}

/// Encode a reading into the payload the device would send; inverse of [`decode_vitals`]
/// for values that fit a byte.
pub fn encode_vitals(heart_rate: u8, spo2: u8, respiration: u8) -> Vec<u8> {
    vec![heart_rate, spo2, respiration]
}

/// Name filter applied while picking a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFilter {
    /// Advertised name must match exactly
    Name(String),
    /// Advertised name must start with the prefix
    NamePrefix(String),
}

impl DeviceFilter {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            DeviceFilter::Name(expected) => name == expected,
            DeviceFilter::NamePrefix(prefix) => name.starts_with(prefix.as_str()),
        }
    }
}

impl fmt::Display for DeviceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceFilter::Name(name) => write!(f, "={}", name),
            DeviceFilter::NamePrefix(prefix) => write!(f, "{}*", prefix),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid device filter '{0}'")]
pub struct FilterParseError(pub String);

impl FromStr for DeviceFilter {
    type Err = FilterParseError;

    /// `=NAME` or `NAME` is an exact match, `PREFIX*` a prefix match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let filter = if let Some(prefix) = s.strip_suffix('*') {
            // An exact marker cannot also be a prefix
            if prefix.starts_with('=') {
                return Err(FilterParseError(s.to_string()));
            }
            DeviceFilter::NamePrefix(prefix.to_string())
        } else {
            DeviceFilter::Name(s.strip_prefix('=').unwrap_or(s).to_string())
        };

        match &filter {
            DeviceFilter::Name(v) | DeviceFilter::NamePrefix(v) if v.is_empty() || v.contains('*') => {
                Err(FilterParseError(s.to_string()))
            }
            _ => Ok(filter),
        }
    }
}

/// Parse a comma-separated filter list such as `=ESP32,COPD*,Health*`
pub fn parse_filters(raw: &str) -> Result<Vec<DeviceFilter>, FilterParseError> {
    let filters = raw
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(DeviceFilter::from_str)
        .collect::<Result<Vec<_>, _>>()?;

    if filters.is_empty() {
        return Err(FilterParseError(raw.to_string()));
    }
    Ok(filters)
}

/// Filters of the known monitor firmwares
pub fn default_filters() -> Vec<DeviceFilter> {
    vec![
        DeviceFilter::Name("ESP32".to_string()),
        DeviceFilter::NamePrefix("COPD".to_string()),
        DeviceFilter::NamePrefix("Health".to_string()),
    ]
}

/// What a platform is asked for when pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDeviceOptions {
    pub filters: Vec<DeviceFilter>,
    pub service: Uuid,
    pub characteristic: Uuid,
}

impl Default for RequestDeviceOptions {
    fn default() -> Self {
        Self::with_filters(default_filters())
    }
}

impl RequestDeviceOptions {
    pub fn with_filters(filters: Vec<DeviceFilter>) -> Self {
        Self {
            filters,
            service: HEART_RATE_SERVICE,
            characteristic: HEART_RATE_MEASUREMENT,
        }
    }

    /// True when any filter accepts the advertised name
    pub fn accepts(&self, name: &str) -> bool {
        self.filters.iter().any(|filter| filter.matches(name))
    }
}
