//! Observability subsystem
//!
//! Structured JSON line logging for the service:
//!
//! ```ignore
//! use ragindex::observability::{log_event, log_event_with_fields, Event};
//!
//! log_event(Event::ConfigLoaded);
//! log_event_with_fields(Event::QueryRejected, &[("reason", "forbidden keyword")]);
//! ```
//!
//! Logging is read-only: a failed write never affects request handling.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
