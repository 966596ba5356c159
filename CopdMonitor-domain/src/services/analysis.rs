use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::{AnalysisResult, VitalsReading};

/// Default quiescence window before a reading is analysed
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Path of the analysis endpoint below the base URL
pub const DEFAULT_ANALYSIS_PATH: &str = "/api/ai-analysis";

/// Remote analysis errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Network or connection failure
    #[error("Analysis request failed: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success status
    #[error("Analysis endpoint returned HTTP {0}")]
    Status(u16),

    /// Response body did not match the expected shape
    #[error("Malformed analysis response: {0}")]
    Decode(String),
}

/// Remote risk assessment of a single reading
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, reading: &VitalsReading) -> Result<AnalysisResult, AnalysisError>;
}

/// `AnalysisClient` posting the raw reading as JSON
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    endpoint: String,
}

impl HttpAnalysisClient {
    pub fn new(base_url: &str, path: &str) -> Self {
        Self::with_client(Client::new(), base_url, path)
    }

    pub fn with_client(client: Client, base_url: &str, path: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), path),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, reading: &VitalsReading) -> Result<AnalysisResult, AnalysisError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(reading)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Status(status.as_u16()));
        }

        response
            .json::<AnalysisResult>()
            .await
            .map_err(|e| AnalysisError::Decode(e.to_string()))
    }
}

/// What the session shows of the analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AnalysisState {
    /// Last successful result; survives failures and disconnects
    pub analysis: Option<AnalysisResult>,

    /// True while at least one request is in flight
    pub loading: bool,
}

/// Coalesces bursts of readings into one analysis request.
///
/// Each reading restarts a quiescence timer; only the reading present when the
/// timer expires is sent. A `None` on the reading channel cancels the pending
/// wait. Requests already in flight always run to completion.
pub struct AnalysisDebouncer {
    state: watch::Receiver<AnalysisState>,
    task: JoinHandle<()>,
}

impl AnalysisDebouncer {
    pub fn spawn(
        client: Arc<dyn AnalysisClient>,
        readings: broadcast::Receiver<Option<VitalsReading>>,
        delay: Duration,
    ) -> Self {
        let (tx, state) = watch::channel(AnalysisState::default());
        let task = tokio::spawn(run_debounce(client, readings, delay, Arc::new(tx)));
        Self { state, task }
    }

    pub fn current(&self) -> AnalysisState {
        self.state.borrow().clone()
    }
}

impl Drop for AnalysisDebouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_debounce(
    client: Arc<dyn AnalysisClient>,
    mut readings: broadcast::Receiver<Option<VitalsReading>>,
    delay: Duration,
    state: Arc<watch::Sender<AnalysisState>>,
) {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let mut pending: Option<VitalsReading> = None;
    let mut deadline = Instant::now();

    loop {
        tokio::select! {
            received = readings.recv() => match received {
                Ok(Some(reading)) => {
                    pending = Some(reading);
                    deadline = Instant::now() + delay;
                }
                Ok(None) => {
                    if pending.take().is_some() {
                        debug!("Pending analysis cancelled by disconnect");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Analysis debouncer skipped {} readings", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = sleep_until(deadline), if pending.is_some() => {
                if let Some(reading) = pending.take() {
                    // Counted before the task starts so `loading` never misses it
                    in_flight.fetch_add(1, Ordering::SeqCst);
                    state.send_modify(|s| s.loading = true);
                    tokio::spawn(request_analysis(
                        client.clone(),
                        reading,
                        state.clone(),
                        in_flight.clone(),
                    ));
                }
            }
        }
    }
    debug!("Reading channel closed, analysis debouncer stopped");
}

async fn request_analysis(
    client: Arc<dyn AnalysisClient>,
    reading: VitalsReading,
    state: Arc<watch::Sender<AnalysisState>>,
    in_flight: Arc<AtomicUsize>,
) {
    let outcome = client.analyze(&reading).await;

    // The counter is read under the state lock so a request starting
    // concurrently cannot be overwritten with `loading = false`
    state.send_modify(|s| {
        let still_running = in_flight.fetch_sub(1, Ordering::SeqCst) > 1;
        match outcome {
            Ok(result) => {
                info!(risk_level = ?result.risk_level, "Analysis updated");
                s.analysis = Some(result);
            }
            Err(e) => error!("AI analysis error: {}", e),
        }
        s.loading = still_running;
    });
}
