//! # Endpoint Handlers
//!
//! One handler per endpoint. Each validates its input, makes at most one
//! store call on the blocking pool and converts every failure into an
//! [`ApiError`] before returning.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::observability::{log_event_with_fields, Event};
use crate::store::{EventStore, StoreError, StoreResult};

use super::clear_key::{ClearKey, CLEAR_KEY_HEADER};
use super::errors::{ApiError, ApiResult};
use super::request::{parse_json_body, parse_list_query, parse_new_event};
use super::response::{self, ClearedResponse, CreatedResponse, QueryResponse};
use super::sql_guard::{self, SqlVerdict};

/// Path segment that selects the clear endpoint instead of an id lookup
pub const CLEAR_SEGMENT: &str = "clear";

/// State shared by every handler; read-only after startup
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub clear_key: ClearKey,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, clear_key: ClearKey) -> Self {
        Self { store, clear_key }
    }

    /// Run one store call on the blocking pool and wait for it
    async fn with_store<T, F>(&self, call: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn EventStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || call(store.as_ref())).await?
    }
}

type SharedState = State<Arc<AppState>>;

fn database_failure(event: Event, err: StoreError) -> ApiError {
    let message = err.to_string();
    log_event_with_fields(event, &[("error", message.as_str())]);
    ApiError::Database
}

/// `POST /api/analytics`
pub async fn create_event(
    State(state): SharedState,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Response> {
    let body = body.map_err(|_| ApiError::MalformedInput)?;
    let event = parse_new_event(&body, chrono::Utc::now().timestamp())?;

    let id = state
        .with_store(move |store| store.insert(&event))
        .await
        .map_err(|e| database_failure(Event::EventInsertFailed, e))?;

    Ok(response::json(StatusCode::CREATED, &CreatedResponse::new(id)))
}

/// `GET /api/analytics`
pub async fn list_events(
    State(state): SharedState,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Response> {
    // An undecodable query string carries no usable filters.
    let pairs = pairs.map(|Query(pairs)| pairs).unwrap_or_default();
    let query = parse_list_query(&pairs);

    let events = state
        .with_store(move |store| store.list(&query))
        .await
        .map_err(|e| database_failure(Event::EventListFailed, e))?;

    Ok(response::json(StatusCode::OK, &events))
}

/// `GET /api/analytics/{id}`
pub async fn get_event(
    State(state): SharedState,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    // A segment that does not decode cannot name a stored id.
    let Path(id) = id.map_err(|_| ApiError::EventNotFound)?;
    if id == CLEAR_SEGMENT {
        return Err(ApiError::RouteNotFound);
    }

    let found = state
        .with_store(move |store| store.get(&id))
        .await
        .map_err(|e| database_failure(Event::EventGetFailed, e))?;

    match found {
        Some(event) => Ok(response::json(StatusCode::OK, &event)),
        None => Err(ApiError::EventNotFound),
    }
}

/// `DELETE /api/analytics/clear`
pub async fn clear_events(
    State(state): SharedState,
    segment: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let Path(segment) = segment.map_err(|_| ApiError::RouteNotFound)?;
    if segment != CLEAR_SEGMENT {
        return Err(ApiError::RouteNotFound);
    }

    let presented = headers.get(CLEAR_KEY_HEADER).map(|v| v.as_bytes());
    if !state.clear_key.matches(presented) {
        log_event_with_fields(
            Event::ClearUnauthorized,
            &[("header_present", if presented.is_some() { "true" } else { "false" })],
        );
        return Err(ApiError::Unauthorized);
    }

    let deleted = state
        .with_store(|store| store.clear())
        .await
        .map_err(|e| database_failure(Event::EventClearFailed, e))?;

    Ok(response::json(StatusCode::OK, &ClearedResponse::new(deleted)))
}

/// `POST /api/query`
pub async fn run_query(
    State(state): SharedState,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Response> {
    let body = body.map_err(|_| ApiError::MalformedInput)?;
    let value = parse_json_body(&body)?;
    let sql = value.get("sql").and_then(|v| v.as_str()).unwrap_or("");

    let sql = match sql_guard::evaluate(sql) {
        SqlVerdict::Allow(sql) => sql.to_string(),
        SqlVerdict::Deny(reason) => {
            let detail = reason.detail();
            log_event_with_fields(Event::QueryRejected, &[("reason", detail.as_str())]);
            return Err(ApiError::Forbidden(reason));
        }
    };

    let output = state
        .with_store(move |store| store.raw_query(&sql))
        .await
        .map_err(|e| {
            let message = e.to_string();
            log_event_with_fields(Event::QueryFailed, &[("error", message.as_str())]);
            ApiError::QueryFailed(message)
        })?;

    Ok(response::json(StatusCode::OK, &QueryResponse::from(output)))
}

/// Anything unrouted: answer preflights, 404 the rest
pub async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        response::preflight()
    } else {
        ApiError::RouteNotFound.into_response()
    }
}
