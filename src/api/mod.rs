//! # Analytics HTTP API
//!
//! Request flow: [`routes`] picks a handler, [`request`] validates input,
//! [`sql_guard`] gates raw SQL, the store executes, [`response`] formats.
//!
//! Requests are stateless and independent. Every failure is converted to
//! the `{"error": "..."}` envelope at the handler boundary.

pub mod clear_key;
pub mod errors;
pub mod handler;
pub mod request;
pub mod response;
pub mod routes;
pub mod sql_guard;

pub use clear_key::{ClearKey, CLEAR_KEY_HEADER, INSECURE_LOCAL_CLEAR_KEY};
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use handler::AppState;
pub use response::{ClearedResponse, CreatedResponse, QueryMeta, QueryResponse};
pub use routes::api_routes;
pub use sql_guard::{evaluate, DenyReason, SqlVerdict};
