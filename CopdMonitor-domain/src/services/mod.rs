// Domain services
// Remote analysis, persistence relay, history and profile logic.

pub mod analysis;
pub mod history;
pub mod profile;
pub mod relay;

// Re-export the service types callers wire together
pub use analysis::{AnalysisClient, AnalysisDebouncer, AnalysisError, AnalysisState, HttpAnalysisClient};
pub use history::{classify, compute_stats, HistoryService, HistoryServiceError};
pub use profile::{ProfileService, ProfileServiceError};
pub use relay::{PersistenceRelay, RelayOutcome};
