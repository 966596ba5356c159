use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use copd_monitor_data::store::{layout, DocumentStore, StoreError};

use crate::entities::conversions::{convert_to_history_document, convert_to_latest_document};
use crate::entities::VitalsReading;

/// Result of relaying one reading; each write is independent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Id of the appended history entry, if the append succeeded
    pub history_id: Option<String>,
    /// Whether the latest-reading document was overwritten
    pub latest_written: bool,
}

/// Mirrors every reading into the user's history and latest-reading documents
#[derive(Clone)]
pub struct PersistenceRelay {
    store: Arc<dyn DocumentStore>,
}

impl PersistenceRelay {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Perform both writes for one reading.
    ///
    /// The writes run concurrently and neither waits on the other's outcome.
    /// Failures are logged and reported in the outcome, never returned as errors.
    pub async fn persist(&self, uid: &str, reading: &VitalsReading) -> RelayOutcome {
        let now = Utc::now();
        let (history, latest) = tokio::join!(
            self.append_history(uid, reading, now),
            self.write_latest(uid, reading, now),
        );

        let history_id = match history {
            Ok(id) => Some(id),
            Err(e) => {
                error!("Error saving health data for {}: {}", uid, e);
                None
            }
        };
        let latest_written = match latest {
            Ok(()) => true,
            Err(e) => {
                error!("Error updating real-time data for {}: {}", uid, e);
                false
            }
        };

        RelayOutcome { history_id, latest_written }
    }

    async fn append_history(&self, uid: &str, reading: &VitalsReading, now: chrono::DateTime<Utc>) -> Result<String, StoreError> {
        let collection = layout::health_history(uid)?;
        let document = self
            .store
            .add(&collection, convert_to_history_document(reading, now))
            .await?;
        Ok(document.id)
    }

    async fn write_latest(&self, uid: &str, reading: &VitalsReading, now: chrono::DateTime<Utc>) -> Result<(), StoreError> {
        let path = layout::latest_reading(uid)?;
        self.store.set(&path, convert_to_latest_document(reading, now)).await
    }

    /// Relay every reading of a channel in the background.
    ///
    /// Each reading is persisted on its own task so a slow store never holds
    /// up the next reading. The task ends when the channel closes.
    pub fn spawn(self, uid: String, mut readings: broadcast::Receiver<Option<VitalsReading>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match readings.recv().await {
                    Ok(Some(reading)) => {
                        let relay = self.clone();
                        let uid = uid.clone();
                        tokio::spawn(async move {
                            relay.persist(&uid, &reading).await;
                        });
                    }
                    Ok(None) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Persistence relay for {} skipped {} readings", uid, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Persistence relay for {} stopped", uid);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copd_monitor_data::store::mock::FaultyDocumentStore;
    use copd_monitor_data::store::{CollectionQuery, InMemoryDocumentStore};
    use std::time::Duration;

    fn reading() -> VitalsReading {
        VitalsReading::new(72, 97, 16, Utc::now())
    }

    #[tokio::test]
    async fn test_writes_history_and_latest() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let relay = PersistenceRelay::new(store.clone());

        let outcome = relay.persist("u1", &reading()).await;
        assert!(outcome.history_id.is_some());
        assert!(outcome.latest_written);

        let history = store
            .query(&layout::health_history("u1").unwrap(), &CollectionQuery::default())
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].data["heartRate"], 72);
        assert!(history[0].data["createdAt"].is_string());

        let latest = store.get(&layout::latest_reading("u1").unwrap()).await.unwrap().unwrap();
        assert_eq!(latest.data["spO2"], 97);
        assert!(latest.data["lastUpdated"].is_string());
    }

    #[tokio::test]
    async fn test_failed_history_write_does_not_block_latest() {
        let store = Arc::new(FaultyDocumentStore::new().fail_writes_under("users/"));
        let relay = PersistenceRelay::new(store.clone());

        let outcome = relay.persist("u1", &reading()).await;

        assert_eq!(outcome, RelayOutcome { history_id: None, latest_written: true });
        assert_eq!(store.write_attempts(), 2);
        assert_eq!(store.inner().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_latest_write_does_not_block_history() {
        let store = Arc::new(FaultyDocumentStore::new().fail_writes_under("realTimeData/"));
        let relay = PersistenceRelay::new(store.clone());

        let outcome = relay.persist("u1", &reading()).await;

        assert!(outcome.history_id.is_some());
        assert!(!outcome.latest_written);
    }

    #[tokio::test]
    async fn test_latest_is_overwritten_history_appended() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let relay = PersistenceRelay::new(store.clone());

        relay.persist("u1", &VitalsReading::new(70, 98, 14, Utc::now())).await;
        relay.persist("u1", &VitalsReading::new(90, 94, 21, Utc::now())).await;

        // two history entries plus one latest document
        assert_eq!(store.len(), 3);
        let latest = store.get(&layout::latest_reading("u1").unwrap()).await.unwrap().unwrap();
        assert_eq!(latest.data["heartRate"], 90);
    }

    #[tokio::test]
    async fn test_spawned_relay_follows_channel() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let (tx, rx) = broadcast::channel(16);
        let handle = PersistenceRelay::new(store.clone()).spawn("u1".to_string(), rx);

        tx.send(Some(reading())).unwrap();
        tx.send(None).unwrap();
        tx.send(Some(reading())).unwrap();
        drop(tx);

        handle.await.unwrap();
        // Persist tasks are detached; give them a moment to land
        for _ in 0..50 {
            if store.len() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.len(), 3);
    }
}
