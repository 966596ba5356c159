// COPD Monitor API
//
// HTTP surface over the monitoring sessions, history and profiles.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod entities;
pub mod openapi;
