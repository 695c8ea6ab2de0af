//! # Routes
//!
//! Exact path and method dispatch:
//!
//! | Method & path                  | Handler            |
//! |--------------------------------|--------------------|
//! | `POST /api/analytics`          | [`create_event`]   |
//! | `GET /api/analytics`           | [`list_events`]    |
//! | `GET /api/analytics/{id}`      | [`get_event`]      |
//! | `DELETE /api/analytics/clear`  | [`clear_events`]   |
//! | `POST /api/query`              | [`run_query`]      |
//! | `OPTIONS` anything             | empty 200          |
//! | `HEAD` anything                | 404 `Not Found`    |
//! | anything else                  | 404 `Not Found`    |
//!
//! `clear` shares the `{id}` slot and is told apart by string equality.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::observability::{log_event_with_fields, Event};

use super::errors::ApiError;
use super::handler::{
    clear_events, create_event, fallback, get_event, list_events, run_query, AppState,
};
use super::response::with_cors;

/// Build the full API router over `state`
pub fn api_routes(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route(
            "/api/analytics",
            get(list_events).post(create_event).fallback(fallback),
        )
        .route(
            "/api/analytics/:id",
            get(get_event).delete(clear_events).fallback(fallback),
        )
        .route("/api/query", post(run_query).fallback(fallback))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(reject_head))
        .layer(middleware::from_fn(log_request));

    with_cors(router)
}

/// HEAD is not a listed method; without this axum would answer it from the GET handlers
async fn reject_head(request: Request, next: Next) -> Response {
    if request.method() == Method::HEAD {
        return ApiError::RouteNotFound.into_response();
    }
    next.run(request).await
}

/// Log one line per request once the response is ready
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    let duration_ms = started.elapsed().as_millis().to_string();
    log_event_with_fields(
        Event::RequestComplete,
        &[
            ("method", method.as_str()),
            ("path", path.as_str()),
            ("status", status.as_str()),
            ("duration_ms", duration_ms.as_str()),
        ],
    );

    response
}
