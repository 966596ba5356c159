// Public entities for the COPD Monitor API
// Request and response bodies that cross the HTTP boundary

// Error responses
pub mod common;

// Device pairing
pub mod device;

// History with per-vital classification
pub mod history;

// Profile creation
pub mod profile;
