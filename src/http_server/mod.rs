//! # HTTP Server Module
//!
//! Configuration and lifecycle for the analytics HTTP service. Routing and
//! request handling live in [`crate::api`].

pub mod config;
pub mod server;

pub use config::{ConfigError, ConfigResult, HttpServerConfig};
pub use server::{HttpServer, ServerError};
