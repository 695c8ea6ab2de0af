//! # Response Formatting
//!
//! JSON envelope, success payloads and the fixed cross-origin header set.
//!
//! Handlers pick the status explicitly; [`json`] only serializes and sets
//! the content type. The CORS headers are stamped on every response,
//! including fallbacks and preflights, by [`with_cors`].

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::store::QueryOutput;

/// `Access-Control-Allow-Origin`
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// `Access-Control-Allow-Methods`
pub const CORS_ALLOW_METHODS: &str = "GET, POST, DELETE, OPTIONS";

/// `Access-Control-Allow-Headers`
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, X-Clear-Key";

/// Stamp the three CORS headers on every response the router produces
pub fn with_cors(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static(CORS_ALLOW_ORIGIN),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(CORS_ALLOW_METHODS),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(CORS_ALLOW_HEADERS),
            )),
    )
}

/// Serialize `body` as the JSON response for `status`
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            bytes,
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            r#"{"error":"Internal error"}"#,
        )
            .into_response(),
    }
}

/// Empty 200 answer to an `OPTIONS` request
pub fn preflight() -> Response {
    StatusCode::OK.into_response()
}

/// `POST /api/analytics` success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: i64,
}

impl CreatedResponse {
    pub fn new(id: i64) -> Self {
        Self { success: true, id }
    }
}

/// `DELETE /api/analytics/clear` success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedResponse {
    pub success: bool,
    pub deleted: u64,
}

impl ClearedResponse {
    pub fn new(deleted: u64) -> Self {
        Self {
            success: true,
            deleted,
        }
    }
}

/// Execution metadata returned next to raw query rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMeta {
    /// Milliseconds spent executing
    pub duration: f64,
    pub rows_read: u64,
    /// Column names in select order, present even when no rows match
    pub columns: Vec<String>,
}

/// `POST /api/query` success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Map<String, Value>>,
    pub meta: QueryMeta,
}

impl From<QueryOutput> for QueryResponse {
    fn from(output: QueryOutput) -> Self {
        Self {
            meta: QueryMeta {
                duration: output.duration_ms,
                rows_read: output.rows.len() as u64,
                columns: output.columns,
            },
            results: output.rows,
        }
    }
}
