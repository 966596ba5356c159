pub mod device;
pub mod health;
pub mod history;
pub mod monitor;
pub mod profile;

// Re-export handlers for easier imports
pub use device::{disconnect_device, pair_device};
pub use health::health_check;
pub use history::get_history;
pub use monitor::{close_session, get_monitor_snapshot};
pub use profile::{create_profile, get_profile, save_profile};
