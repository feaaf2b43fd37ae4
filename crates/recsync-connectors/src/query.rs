//! SQL dialect fragments and restriction queries
//!
//! Identifier values are never spliced into SQL text: restrictions use one
//! positional `?` per identifier and the values travel as parameters.

use serde::{Deserialize, Serialize};

/// Alias given to the wrapped base query
const SOURCE_ALIAS: &str = "sync_src";

/// SQL differences between the supported engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    /// SQLite files (`LIMIT`, `sqlite_master`)
    Sqlite,
    /// SQL Server over ODBC (`TOP`, `INFORMATION_SCHEMA`)
    MsSql,
}

/// Whether rows must match or avoid the identifier list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    Include,
    Exclude,
}

impl Dialect {
    /// Single-row probe over the base query.
    pub fn sample_query(&self, base: &str) -> String {
        match self {
            Self::Sqlite => format!("SELECT * FROM ({base}) AS sample_table LIMIT 1"),
            Self::MsSql => format!("SELECT TOP 1 * FROM ({base}) AS sample_table"),
        }
    }

    /// Lists tables and views; result column `name`.
    pub fn collections_query(&self) -> &'static str {
        match self {
            Self::Sqlite => {
                "SELECT name FROM sqlite_master \
                 WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'"
            }
            Self::MsSql => "SELECT name FROM SYSOBJECTS WHERE xtype = 'U' OR xtype = 'V'",
        }
    }

    /// Lists columns of the collection bound to the single parameter;
    /// result column `name`.
    pub fn field_names_query(&self) -> &'static str {
        match self {
            Self::Sqlite => "SELECT name FROM pragma_table_info(?)",
            Self::MsSql => {
                "SELECT COLUMN_NAME AS name FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = ?"
            }
        }
    }

    /// First `limit` rows of a collection, all columns.
    pub fn sample_values_query(&self, collection: &str, limit: usize) -> String {
        let quoted = self.quote_ident(collection);
        match self {
            Self::Sqlite => format!("SELECT * FROM {quoted} LIMIT {limit}"),
            Self::MsSql => format!("SELECT TOP {limit} * FROM {quoted}"),
        }
    }

    /// Quote a table or column name.
    pub fn quote_ident(&self, name: &str) -> String {
        match self {
            Self::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
            Self::MsSql => format!("[{}]", name.replace(']', "]]")),
        }
    }

    /// Wrap `base` and restrict it to (or away from) `count` identifiers.
    ///
    /// Returns `base` unchanged when there is nothing to restrict by.
    pub fn restricted_query(
        &self,
        base: &str,
        ident: &str,
        restriction: Restriction,
        count: usize,
    ) -> String {
        if count == 0 {
            return base.to_string();
        }
        let placeholders = vec!["?"; count].join(", ");
        let op = match restriction {
            Restriction::Include => "IN",
            Restriction::Exclude => "NOT IN",
        };
        let column = self.quote_ident(ident);
        format!("SELECT * FROM ({base}) AS {SOURCE_ALIAS} WHERE {column} {op} ({placeholders})")
    }
}
