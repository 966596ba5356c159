// COPD Monitor Domain
// This crate contains the business logic of the respiratory monitoring service

// Device link to the wearable
pub mod device;

// Services that implement business logic
pub mod services;

// Per-user monitoring sessions
pub mod session;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the store module from copd_monitor_data for convenience
pub use copd_monitor_data::store;

// Testing utilities - available in unit tests and with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
