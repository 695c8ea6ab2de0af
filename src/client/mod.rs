//! # Analytics Client
//!
//! Native counterpart of the browser sender, reader and query pages.
//!
//! All settings travel in an explicit [`ClientConfig`]; nothing is read
//! from or written to process-wide state.
//!
//! ```ignore
//! let config = ClientConfig::with_user_id_file("http://localhost:8788", &id_path)?;
//! let client = AnalyticsClient::new(config);
//! client.send_event("demo", "click", EventMetadata::default()).await?;
//! ```

mod errors;
mod identity;

use std::path::Path;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{ClearedResponse, CreatedResponse, ErrorResponse, QueryResponse, CLEAR_KEY_HEADER};
use crate::store::Event;

pub use errors::{ClientError, ClientResult};
pub use identity::load_or_create_user_id;

/// Worker URL used when none is given
pub const DEFAULT_WORKER_URL: &str = "http://localhost:8788";

/// Where to send requests and who is sending them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash
    pub worker_url: String,
    /// Stable identifier attached to every sent event
    pub user_id: String,
}

impl ClientConfig {
    /// Config whose user id is kept in `path` across runs
    pub fn with_user_id_file(worker_url: impl Into<String>, path: &Path) -> ClientResult<Self> {
        Ok(Self::with_user_id(worker_url, load_or_create_user_id(path)?))
    }

    /// Config for `worker_url` with a freshly generated, unstored user id
    pub fn new(worker_url: impl Into<String>) -> Self {
        Self::with_user_id(worker_url, uuid::Uuid::new_v4().to_string())
    }

    /// Config with a caller-chosen user id
    pub fn with_user_id(worker_url: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            worker_url: worker_url.into().trim_end_matches('/').to_string(),
            user_id: user_id.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.worker_url, path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_URL)
    }
}

/// Optional context sent along with an event
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_params: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Filters for [`AnalyticsClient::fetch_events`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    pub limit: Option<u32>,
    pub app_name: Option<String>,
    pub action_name: Option<String>,
    pub user_id: Option<String>,
}

impl EventFilters {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        let text = [
            ("appName", &self.app_name),
            ("actionName", &self.action_name),
            ("userId", &self.user_id),
        ];
        for (key, value) in text {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                pairs.push((key, value.clone()));
            }
        }
        pairs
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventPayload<'a> {
    app_name: &'a str,
    action_name: &'a str,
    user_id: &'a str,
    #[serde(flatten)]
    metadata: &'a EventMetadata,
}

#[derive(Serialize)]
struct QueryPayload<'a> {
    sql: &'a str,
}

/// HTTP client for the analytics API
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl AnalyticsClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// `POST /api/analytics` as this client's user
    pub async fn send_event(
        &self,
        app_name: &str,
        action_name: &str,
        metadata: EventMetadata,
    ) -> ClientResult<CreatedResponse> {
        if app_name.is_empty() {
            return Err(ClientError::MissingArgument("app_name"));
        }
        if action_name.is_empty() {
            return Err(ClientError::MissingArgument("action_name"));
        }

        let payload = EventPayload {
            app_name,
            action_name,
            user_id: &self.config.user_id,
            metadata: &metadata,
        };
        let response = self
            .http
            .post(self.config.endpoint("/api/analytics"))
            .json(&payload)
            .send()
            .await?;
        decode(response).await
    }

    /// `GET /api/analytics`
    pub async fn fetch_events(&self, filters: &EventFilters) -> ClientResult<Vec<Event>> {
        let response = self
            .http
            .get(self.config.endpoint("/api/analytics"))
            .query(&filters.to_pairs())
            .send()
            .await?;
        decode(response).await
    }

    /// `GET /api/analytics/{id}`
    pub async fn fetch_event(&self, id: i64) -> ClientResult<Event> {
        let response = self
            .http
            .get(self.config.endpoint(&format!("/api/analytics/{}", id)))
            .send()
            .await?;
        decode(response).await
    }

    /// `POST /api/query`
    pub async fn execute_query(&self, sql: &str) -> ClientResult<QueryResponse> {
        if sql.trim().is_empty() {
            return Err(ClientError::MissingArgument("sql"));
        }

        let response = self
            .http
            .post(self.config.endpoint("/api/query"))
            .json(&QueryPayload { sql })
            .send()
            .await?;
        decode(response).await
    }

    /// `DELETE /api/analytics/clear`
    pub async fn clear(&self, key: &str) -> ClientResult<ClearedResponse> {
        let response = self
            .http
            .delete(self.config.endpoint("/api/analytics/clear"))
            .header(CLEAR_KEY_HEADER, key)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    };
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}
