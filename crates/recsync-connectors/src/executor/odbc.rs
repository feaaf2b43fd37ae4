//! ODBC data sources
//!
//! The driver manager is only linked with the `odbc` feature. Without it the
//! executor still exists so configurations parse, but every query reports a
//! connection failure.

use super::QueryExecutor;
#[cfg(not(feature = "odbc"))]
use crate::ConnectorError;
use crate::{DbRows, Result};

/// Executes queries through an ODBC connection string.
#[derive(Clone)]
pub struct OdbcExecutor {
    connection_string: String,
}

impl OdbcExecutor {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
        }
    }
}

impl std::fmt::Debug for OdbcExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdbcExecutor")
            .field("target", &self.describe())
            .finish()
    }
}

impl QueryExecutor for OdbcExecutor {
    #[cfg(feature = "odbc")]
    fn execute(&self, query: &str, params: &[String]) -> Result<DbRows> {
        driver::execute(&self.connection_string, query, params)
    }

    #[cfg(not(feature = "odbc"))]
    fn execute(&self, query: &str, _params: &[String]) -> Result<DbRows> {
        tracing::debug!(query, "odbc query rejected");
        Err(ConnectorError::connection(
            self.describe(),
            "recsync was built without ODBC support (enable the `odbc` feature)",
        ))
    }

    /// Server/DSN/Database keys only; credentials stay out of logs
    fn describe(&self) -> String {
        let visible: Vec<&str> = self
            .connection_string
            .split(';')
            .map(str::trim)
            .filter(|part| {
                let key = part.split('=').next().unwrap_or_default().to_ascii_lowercase();
                matches!(key.as_str(), "server" | "dsn" | "database" | "driver")
            })
            .collect();
        format!("odbc:{}", visible.join(";"))
    }
}

#[cfg(feature = "odbc")]
mod driver {
    use odbc_api::buffers::TextRowSet;
    use odbc_api::{ConnectionOptions, Cursor, Environment, IntoParameter, ResultSetMetadata};

    use crate::{ConnectorError, DbRows, Result, SqlValue};

    const BATCH_SIZE: usize = 500;
    const MAX_STR_LEN: usize = 4096;

    pub(super) fn execute(connection_string: &str, query: &str, params: &[String]) -> Result<DbRows> {
        tracing::debug!(query, params = params.len(), "odbc query");
        let env = Environment::new().map_err(|e| ConnectorError::connection("ODBC", e.to_string()))?;
        let conn = env
            .connect_with_connection_string(connection_string, ConnectionOptions::default())
            .map_err(|e| ConnectorError::connection("ODBC", e.to_string()))?;

        let bound: Vec<_> = params.iter().map(|p| p.as_str().into_parameter()).collect();
        let Some(mut cursor) = conn
            .execute(query, &bound[..])
            .map_err(|e| ConnectorError::query(query, e))?
        else {
            return Ok(DbRows::empty());
        };

        let columns: Vec<String> = cursor
            .column_names()
            .map_err(|e| ConnectorError::query(query, e))?
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ConnectorError::query(query, e))?;

        let buffer = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_STR_LEN))
            .map_err(|e| ConnectorError::query(query, e))?;
        let mut row_set = cursor
            .bind_buffer(buffer)
            .map_err(|e| ConnectorError::query(query, e))?;

        let mut rows = Vec::new();
        while let Some(batch) = row_set.fetch().map_err(|e| ConnectorError::query(query, e))? {
            for row in 0..batch.num_rows() {
                let values = (0..columns.len())
                    .map(|col| match batch.at(col, row) {
                        None => SqlValue::Null,
                        Some(bytes) => match std::str::from_utf8(bytes) {
                            Ok(s) => SqlValue::Text(s.to_string()),
                            Err(_) => SqlValue::Blob(bytes.to_vec()),
                        },
                    })
                    .collect();
                rows.push(values);
            }
        }

        DbRows::new(columns, rows)
    }
}
