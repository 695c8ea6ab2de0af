//! ragindex - a minimal event analytics service
//!
//! Records application events in SQLite, serves them back over a small
//! JSON API, and exposes a guarded read-only SQL endpoint.

pub mod api;
pub mod cli;
pub mod client;
pub mod http_server;
pub mod observability;
pub mod store;
