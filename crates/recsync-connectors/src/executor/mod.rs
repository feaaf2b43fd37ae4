//! Native query execution per driver

mod odbc;
mod sqlite;

pub use odbc::OdbcExecutor;
pub use sqlite::SqliteExecutor;

use crate::{DbRows, Result};

/// Runs one query with positional `?` parameters and returns all rows.
///
/// Implementations open a fresh connection per call; runs issue a handful of
/// queries per target, so pooling buys nothing.
pub trait QueryExecutor: Send {
    fn execute(&self, query: &str, params: &[String]) -> Result<DbRows>;

    /// Human-readable location for logs; must not contain secrets
    fn describe(&self) -> String;
}
