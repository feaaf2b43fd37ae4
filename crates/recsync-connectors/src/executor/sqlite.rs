//! SQLite files via rusqlite

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use super::QueryExecutor;
use crate::{ConnectorError, DbRows, Result, SqlValue};

/// Executes queries against a SQLite database file, read-only.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    db_path: PathBuf,
}

impl SqliteExecutor {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        // Read-only so a mistyped path never creates an empty database
        Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            ConnectorError::connection(
                format!("SQLite database {}", self.db_path.display()),
                e.to_string(),
            )
        })
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, query: &str, params: &[String]) -> Result<DbRows> {
        tracing::debug!(db = %self.db_path.display(), query, params = params.len(), "sqlite query");
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(query)
            .map_err(|e| ConnectorError::query(query, e))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(|e| ConnectorError::query(query, e))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| ConnectorError::query(query, e))? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value = row
                    .get_ref(idx)
                    .map_err(|e| ConnectorError::query(query, e))?;
                values.push(from_value_ref(value));
            }
            out.push(values);
        }

        DbRows::new(columns, out)
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.db_path.display())
    }
}

fn from_value_ref(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(r) => SqlValue::Real(r),
        // Text stored in a legacy encoding is left for the transform to decode
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => SqlValue::Text(s.to_string()),
            Err(_) => SqlValue::Blob(bytes.to_vec()),
        },
        ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
    }
}
