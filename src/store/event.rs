//! Event data model
//!
//! `Event` is the persisted row as it is returned to clients (snake_case
//! column names). `NewEvent` is a validated insert; `ListQuery` a validated
//! list request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default number of rows returned by a list request
pub const DEFAULT_LIMIT: u32 = 100;

/// Maximum number of rows a list request may return
pub const MAX_LIMIT: u32 = 1000;

/// One recorded analytics action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub app_name: String,
    pub user_id: String,
    pub action_name: String,
    pub user_agent: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub referrer: Option<String>,
    /// JSON-encoded URL parameters
    pub url_params: Option<String>,
    /// Seconds since the Unix epoch
    pub timestamp: Option<i64>,
    /// `YYYY-MM-DD HH:MM:SS`, UTC, assigned by the store
    pub created_at: String,
}

/// A validated event ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub app_name: String,
    pub user_id: String,
    pub action_name: String,
    pub user_agent: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub referrer: Option<String>,
    pub url_params: Option<String>,
    pub timestamp: i64,
}

impl NewEvent {
    /// Minimal event with only the required fields
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        action_name: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            action_name: action_name.into(),
            user_agent: None,
            timezone: None,
            language: None,
            referrer: None,
            url_params: None,
            timestamp,
        }
    }
}

/// Equality filters and row cap for a list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Always within `1..=MAX_LIMIT`
    pub limit: u32,
    pub app_name: Option<String>,
    pub action_name: Option<String>,
    pub user_id: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            app_name: None,
            action_name: None,
            user_id: None,
        }
    }
}

/// Result of a raw read-only query
#[derive(Debug, Clone, Default)]
pub struct QueryOutput {
    /// Column names in select order
    pub columns: Vec<String>,
    /// One map per row, keys in column order
    pub rows: Vec<Map<String, Value>>,
    /// Wall-clock execution time in milliseconds
    pub duration_ms: f64,
}
