//! SQLite-backed event store

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};
use super::event::{Event, ListQuery, NewEvent, QueryOutput};
use super::EventStore;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS analytics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_name TEXT NOT NULL,
    user_id TEXT NOT NULL,
    action_name TEXT NOT NULL,
    user_agent TEXT,
    timezone TEXT,
    language TEXT,
    referrer TEXT,
    url_params TEXT,
    timestamp INTEGER,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
";

const INSERT_SQL: &str = "INSERT INTO analytics \
    (app_name, user_id, action_name, user_agent, timezone, language, referrer, url_params, \
    timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

/// Event store over a single SQLite connection
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the `analytics` table exists
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Open `":memory:"` in memory, anything else as a file path
    pub fn open_location(location: &str) -> StoreResult<Self> {
        if location == ":memory:" {
            Self::open_in_memory()
        } else {
            Self::open(location)
        }
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl EventStore for SqliteStore {
    fn insert(&self, event: &NewEvent) -> StoreResult<i64> {
        let conn = self.lock()?;
        conn.execute(
            INSERT_SQL,
            params![
                event.app_name,
                event.user_id,
                event.action_name,
                event.user_agent,
                event.timezone,
                event.language,
                event.referrer,
                event.url_params,
                event.timestamp,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list(&self, query: &ListQuery) -> StoreResult<Vec<Event>> {
        let mut sql = String::from("SELECT * FROM analytics WHERE 1=1");
        let mut bound: Vec<SqlValue> = Vec::new();

        let filters = [
            ("app_name", &query.app_name),
            ("action_name", &query.action_name),
            ("user_id", &query.user_id),
        ];
        for (column, value) in filters {
            if let Some(value) = value {
                sql.push_str(" AND ");
                sql.push_str(column);
                sql.push_str(" = ?");
                bound.push(SqlValue::Text(value.clone()));
            }
        }

        // id breaks ties between rows created within the same second
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
        bound.push(SqlValue::Integer(i64::from(query.limit)));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(bound.iter()), event_from_row)?;
        let events = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    fn get(&self, id: &str) -> StoreResult<Option<Event>> {
        // Non-numeric ids bind as text and never match the integer key.
        let key = match id.parse::<i64>() {
            Ok(n) => SqlValue::Integer(n),
            Err(_) => SqlValue::Text(id.to_string()),
        };

        let conn = self.lock()?;
        let event = conn
            .query_row(
                "SELECT * FROM analytics WHERE id = ?1",
                params![key],
                event_from_row,
            )
            .optional()?;
        Ok(event)
    }

    fn clear(&self) -> StoreResult<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM analytics", [])?;
        Ok(deleted as u64)
    }

    fn raw_query(&self, sql: &str) -> StoreResult<QueryOutput> {
        let conn = self.lock()?;
        let started = Instant::now();

        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut object = Map::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                object.insert(name.clone(), sqlite_value_to_json(row, idx)?);
            }
            rows.push(object);
        }

        Ok(QueryOutput {
            columns,
            rows,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get("id")?,
        app_name: row.get("app_name")?,
        user_id: row.get("user_id")?,
        action_name: row.get("action_name")?,
        user_agent: row.get("user_agent")?,
        timezone: row.get("timezone")?,
        language: row.get("language")?,
        referrer: row.get("referrer")?,
        url_params: row.get("url_params")?,
        timestamp: row.get("timestamp")?,
        created_at: row.get("created_at")?,
    })
}

fn sqlite_value_to_json(row: &Row<'_>, idx: usize) -> rusqlite::Result<Value> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    };
    Ok(value)
}
