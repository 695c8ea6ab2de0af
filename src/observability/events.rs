//! Observable events
//!
//! Events are explicit and typed; the wire name is what ends up in the log line.

use std::fmt;

use super::Severity;

/// Observable events in the analytics service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration resolved (file, environment, flags)
    ConfigLoaded,
    /// Event store opened and schema ensured
    StoreOpened,
    /// Server bound and accepting requests
    Serving,
    /// Shutdown signal received
    ShutdownStart,
    /// Server stopped accepting requests
    ShutdownComplete,
    /// Clear endpoint is protected by the built-in local key
    InsecureClearKey,
    /// Startup failed (FATAL)
    BootFailed,

    // Requests
    /// Request finished, any status
    RequestComplete,

    // Datastore failures
    /// Inserting an event failed
    EventInsertFailed,
    /// Listing events failed
    EventListFailed,
    /// Looking up a single event failed
    EventGetFailed,
    /// Clearing the table failed
    EventClearFailed,
    /// Raw SQL execution failed
    QueryFailed,

    // Rejections
    /// Raw SQL refused by the keyword guard
    QueryRejected,
    /// Clear attempted with a wrong or missing key
    ClearUnauthorized,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::Serving => "RAGINDEX_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::InsecureClearKey => "INSECURE_CLEAR_KEY",
            Event::BootFailed => "BOOT_FAILED",

            Event::RequestComplete => "REQUEST_COMPLETE",

            Event::EventInsertFailed => "EVENT_INSERT_FAILED",
            Event::EventListFailed => "EVENT_LIST_FAILED",
            Event::EventGetFailed => "EVENT_GET_FAILED",
            Event::EventClearFailed => "EVENT_CLEAR_FAILED",
            Event::QueryFailed => "QUERY_FAILED",

            Event::QueryRejected => "QUERY_REJECTED",
            Event::ClearUnauthorized => "CLEAR_UNAUTHORIZED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::BootFailed => Severity::Fatal,
            Event::EventInsertFailed
            | Event::EventListFailed
            | Event::EventGetFailed
            | Event::EventClearFailed
            | Event::QueryFailed => Severity::Error,
            Event::InsecureClearKey | Event::QueryRejected | Event::ClearUnauthorized => {
                Severity::Warn
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
