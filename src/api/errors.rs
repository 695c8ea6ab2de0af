//! # API Errors
//!
//! Every failure a request can hit, mapped to its HTTP status. Errors never
//! escape a single request: they become the JSON envelope `{"error": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::response;
use super::sql_guard::DenyReason;

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Body is not parseable JSON
    #[error("Invalid JSON")]
    MalformedInput,

    /// A required field is missing or falsy
    #[error("Missing required fields: appName, userId, actionName")]
    MissingRequiredFields,

    /// Clear key mismatch
    #[error("Unauthorized")]
    Unauthorized,

    /// Raw SQL refused by the keyword guard
    #[error("{}", .0.message())]
    Forbidden(DenyReason),

    /// Unknown event id
    #[error("Not found")]
    EventNotFound,

    /// Unknown path or method
    #[error("Not Found")]
    RouteNotFound,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Datastore failure; the cause is logged, never returned
    #[error("Database error")]
    Database,

    /// Raw SQL execution failure; the datastore's message is returned as-is
    #[error("{0}")]
    QueryFailed(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedInput | ApiError::MissingRequiredFields => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::EventNotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Database | ApiError::QueryFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        response::json(self.status_code(), &ErrorResponse::from(&self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MalformedInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingRequiredFields.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden(DenyReason::NotSelect).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::EventNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::RouteNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Database.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_messages_differ_by_cause() {
        assert_eq!(ApiError::EventNotFound.to_string(), "Not found");
        assert_eq!(ApiError::RouteNotFound.to_string(), "Not Found");
    }

    #[test]
    fn test_forbidden_message_hides_keyword() {
        let err = ApiError::Forbidden(DenyReason::ForbiddenKeyword("DROP"));
        assert_eq!(err.to_string(), "SQL statement contains forbidden keywords");
    }

    #[test]
    fn test_query_failure_passes_message_through() {
        let err = ApiError::QueryFailed("no such table: nope".to_string());
        assert_eq!(ErrorResponse::from(&err).error, "no such table: nope");
    }
}
