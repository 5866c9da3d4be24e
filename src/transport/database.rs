use crate::error::CallError;
use crate::graph::DatabaseOperation;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params_from_iter};
use serde_json::{Map, Value as JsonValue, json};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// A fully resolved database call, with every variable already substituted.
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseRequest {
    Document {
        operation: DatabaseOperation,
        collection: String,
        filter: JsonValue,
        document: JsonValue,
    },
    Relational {
        query: String,
        params: Vec<String>,
    },
}

/// The database collaborator used by Database nodes.
pub trait DatabaseClient: Send + Sync {
    fn execute(&self, request: &DatabaseRequest, timeout_ms: u64) -> Result<JsonValue, CallError>;
}

/// Relational driver over a SQLite connection. Parameters are always bound, never
/// spliced into the SQL text.
pub struct SqliteClient {
    connection: Mutex<Connection>,
}

impl SqliteClient {
    pub fn open(path: &str) -> Result<Self, CallError> {
        Connection::open(path)
            .map(Self::from_connection)
            .map_err(|e| CallError::Transport(format!("could not open '{}': {}", path, e)))
    }

    pub fn open_in_memory() -> Result<Self, CallError> {
        Connection::open_in_memory()
            .map(Self::from_connection)
            .map_err(|e| CallError::Transport(e.to_string()))
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(connection),
        }
    }

    fn run_query(
        connection: &Connection,
        query: &str,
        params: &[String],
    ) -> rusqlite::Result<JsonValue> {
        let mut statement = connection.prepare(query)?;
        if statement.column_count() == 0 {
            let affected = statement.execute(params_from_iter(params.iter()))?;
            return Ok(json!({ "affectedRows": affected }));
        }

        let columns: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut rows = statement.query(params_from_iter(params.iter()))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut object = Map::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                object.insert(column.clone(), sql_to_json(row.get_ref(index)?));
            }
            results.push(JsonValue::Object(object));
        }
        Ok(JsonValue::Array(results))
    }
}

fn sql_to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(f) => json!(f),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => JsonValue::String(format!("<blob {} bytes>", bytes.len())),
    }
}

impl DatabaseClient for SqliteClient {
    fn execute(&self, request: &DatabaseRequest, timeout_ms: u64) -> Result<JsonValue, CallError> {
        let DatabaseRequest::Relational { query, params } = request else {
            return Err(CallError::Unsupported(
                "document operations are not available on a SQLite connection".to_string(),
            ));
        };

        let connection = self
            .connection
            .lock()
            .map_err(|_| CallError::Transport("sqlite connection lock poisoned".to_string()))?;
        connection
            .busy_timeout(Duration::from_millis(timeout_ms))
            .map_err(|e| CallError::Transport(e.to_string()))?;

        debug!(query = %query, params = params.len(), "Running SQL query");
        Self::run_query(&connection, query, params).map_err(|e| CallError::Transport(e.to_string()))
    }
}
