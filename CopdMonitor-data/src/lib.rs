// COPD Monitor Data
// This crate handles document persistence for the monitoring service

// Database connection management
#[cfg(feature = "sqlite")]
pub mod database;

// Document store abstraction and its backends
pub mod store;

// Data storage models
pub mod models;
