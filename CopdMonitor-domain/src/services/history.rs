use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use copd_monitor_data::models::SortDirection;
use copd_monitor_data::store::{layout, CollectionQuery, DocumentStore, StoreError};

use crate::entities::conversions::convert_to_domain_history_record;
use crate::entities::{HistoryRecord, HistoryStats, VitalKind, VitalStatus};

/// Number of entries shown when no limit is given
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Upper bound accepted for a history page
pub const MAX_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum HistoryServiceError {
    #[error("Invalid limit: {0}")]
    InvalidLimit(usize),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Read side of the vitals history
#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn DocumentStore>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Newest `limit` entries of a user's history, newest first.
    ///
    /// Entries that no longer parse are skipped with a warning.
    pub async fn recent_history(&self, uid: &str, limit: usize) -> Result<Vec<HistoryRecord>, HistoryServiceError> {
        if limit == 0 || limit > MAX_HISTORY_LIMIT {
            return Err(HistoryServiceError::InvalidLimit(limit));
        }

        let query = CollectionQuery::order_by("createdAt", SortDirection::Descending)?.limit(limit);
        let documents = self.store.query(&layout::health_history(uid)?, &query).await?;
        debug!("Loaded {} history entries for {}", documents.len(), uid);

        Ok(documents
            .into_iter()
            .filter_map(|document| match convert_to_domain_history_record(document) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            })
            .collect())
    }
}

/// Integer mean rounded to nearest, halves rounding up
fn rounded_mean(values: impl Iterator<Item = u16>, count: usize) -> u16 {
    let sum: u64 = values.map(u64::from).sum();
    let n = count as u64;
    ((2 * sum + n) / (2 * n)) as u16
}

/// Summary statistics of a history page ordered newest first; `None` when empty
pub fn compute_stats(records: &[HistoryRecord]) -> Option<HistoryStats> {
    let newest = records.first()?;
    let n = records.len();

    Some(HistoryStats {
        avg_heart_rate: rounded_mean(records.iter().map(|r| r.reading.heart_rate), n),
        avg_spo2: rounded_mean(records.iter().map(|r| r.reading.spo2), n),
        avg_respiration: rounded_mean(records.iter().map(|r| r.reading.respiration_rate), n),
        last_check: newest.created_at,
        total_readings: n,
    })
}

/// Display classification of one vital value
pub fn classify(kind: VitalKind, value: u16) -> VitalStatus {
    match kind {
        VitalKind::HeartRate if !(60..=100).contains(&value) => VitalStatus::Warning,
        VitalKind::SpO2 if value < 95 => VitalStatus::Critical,
        VitalKind::SpO2 if value < 98 => VitalStatus::Warning,
        VitalKind::Respiration if !(12..=20).contains(&value) => VitalStatus::Warning,
        _ => VitalStatus::Normal,
    }
}
