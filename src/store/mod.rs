//! # Event Store
//!
//! The persistence gateway the HTTP handlers delegate to. Handlers only see
//! the [`EventStore`] trait; [`SqliteStore`] is the bundled implementation.
//!
//! Every call is synchronous and runs to completion: there are no retries,
//! timeouts or background writes at this layer.

mod errors;
mod event;
mod sqlite;

pub use errors::{StoreError, StoreResult};
pub use event::{Event, ListQuery, NewEvent, QueryOutput, DEFAULT_LIMIT, MAX_LIMIT};
pub use sqlite::SqliteStore;

/// Narrow interface over the relational datastore holding the `analytics` table
pub trait EventStore: Send + Sync {
    /// Insert one event, returning the id the store assigned
    fn insert(&self, event: &NewEvent) -> StoreResult<i64>;

    /// Rows matching every present filter, newest first, at most `query.limit`
    fn list(&self, query: &ListQuery) -> StoreResult<Vec<Event>>;

    /// Exact id lookup; `Ok(None)` when no row matches
    fn get(&self, id: &str) -> StoreResult<Option<Event>>;

    /// Delete every row, returning how many were removed
    fn clear(&self) -> StoreResult<u64>;

    /// Execute literal SQL text and collect its rows
    ///
    /// No safety checks happen here; callers gate the text first.
    fn raw_query(&self, sql: &str) -> StoreResult<QueryOutput>;
}
