//! Configurable backends and their connection parameters

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::executor::{OdbcExecutor, QueryExecutor, SqliteExecutor};
use crate::{CollectionInfo, Connector, ConnectorError, Dialect, Result, SqlValue};

/// Identifier cap for TopKontor restriction queries.
///
/// TopKontor's ODBC bridge rejects statements above a fixed token count, and
/// its default view only covers the most recent changes anyway.
pub const TOPKONTOR_IDENT_LIMIT: usize = 2000;

/// Sample values returned per field by [`ConnectionType::fields`]
pub const FIELD_SAMPLE_SIZE: usize = 50;

/// The closed set of source types a target can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConnectionType {
    #[serde(rename = "SQLite")]
    Sqlite,
    /// SQLite database written by Benning tooling
    Benning,
    /// SQL Server database of the Mosaik ERP
    Mosaik,
    /// TopKontor ODBC bridge
    TopKontor,
}

/// What a connection type resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backend {
    pub dialect: Dialect,
    pub supports_introspection: bool,
    pub ident_limit: Option<usize>,
}

/// Field names of a collection plus sample values for each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldListing {
    /// Sorted
    pub names: Vec<String>,
    pub samples: BTreeMap<String, Vec<SqlValue>>,
}

impl ConnectionType {
    pub const ALL: [ConnectionType; 4] = [
        ConnectionType::Sqlite,
        ConnectionType::Benning,
        ConnectionType::Mosaik,
        ConnectionType::TopKontor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "SQLite",
            Self::Benning => "Benning",
            Self::Mosaik => "Mosaik",
            Self::TopKontor => "TopKontor",
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            Self::Sqlite | Self::Benning => Backend {
                dialect: Dialect::Sqlite,
                supports_introspection: true,
                ident_limit: None,
            },
            Self::Mosaik => Backend {
                dialect: Dialect::MsSql,
                supports_introspection: true,
                ident_limit: None,
            },
            Self::TopKontor => Backend {
                dialect: Dialect::MsSql,
                supports_introspection: false,
                ident_limit: Some(TOPKONTOR_IDENT_LIMIT),
            },
        }
    }

    /// Build the query executor for these parameters.
    pub fn executor(&self, params: &ConnectionParams) -> Result<Box<dyn QueryExecutor>> {
        match (self, params) {
            (Self::Sqlite | Self::Benning, ConnectionParams::Sqlite { db_path }) => {
                Ok(Box::new(SqliteExecutor::new(db_path)))
            }
            (Self::Mosaik | Self::TopKontor, ConnectionParams::Odbc { odbc_connection_str }) => {
                Ok(Box::new(OdbcExecutor::new(odbc_connection_str.clone())))
            }
            (Self::Mosaik, ConnectionParams::Mosaik(mosaik)) => {
                Ok(Box::new(OdbcExecutor::new(mosaik.to_connection_string())))
            }
            (_, other) => Err(ConnectorError::InvalidParams {
                backend: self.to_string(),
                message: format!("{} parameters do not apply", other.kind()),
            }),
        }
    }

    /// Sorted names of the tables and views visible through the connection.
    pub fn collections(&self, params: &ConnectionParams) -> Result<Vec<String>> {
        self.require_introspection("listing collections")?;
        let executor = self.executor(params)?;
        let rows = executor.execute(self.backend().dialect.collections_query(), &[])?;

        let mut names: Vec<String> = rows
            .column_values("name")
            .unwrap_or_default()
            .into_iter()
            .map(|v| v.to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Sorted field names of `collection` plus up to
    /// [`FIELD_SAMPLE_SIZE`] sample values per field.
    pub fn fields(&self, params: &ConnectionParams, collection: &str) -> Result<FieldListing> {
        self.require_introspection("listing fields")?;
        let dialect = self.backend().dialect;
        let executor = self.executor(params)?;

        let meta = executor.execute(dialect.field_names_query(), &[collection.to_string()])?;
        let mut names: Vec<String> = meta
            .column_values("name")
            .unwrap_or_default()
            .into_iter()
            .map(|v| v.to_string())
            .collect();
        names.sort();

        let samples = executor
            .execute(&dialect.sample_values_query(collection, FIELD_SAMPLE_SIZE), &[])?
            .by_column();

        Ok(FieldListing { names, samples })
    }

    /// Open a connector for `collection` and prove it can read a sample.
    pub fn healthy_connection(
        &self,
        params: &ConnectionParams,
        collection: CollectionInfo,
    ) -> Result<Box<dyn Connector>> {
        crate::connector::healthy_connection(*self, params, collection)
    }

    fn require_introspection(&self, operation: &'static str) -> Result<()> {
        if self.backend().supports_introspection {
            Ok(())
        } else {
            Err(ConnectorError::NotSupported {
                backend: self.to_string(),
                operation,
            })
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown connection type '{s}' (expected one of {})", known.join(", "))
            })
    }
}

/// Backend-specific connection parameters, stored as a flat mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConnectionParams {
    Sqlite { db_path: String },
    Odbc { odbc_connection_str: String },
    Mosaik(MosaikParams),
}

impl ConnectionParams {
    fn kind(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => "SQLite",
            Self::Odbc { .. } => "ODBC",
            Self::Mosaik(_) => "Mosaik",
        }
    }
}

/// Structured Mosaik connection; keys match the ODBC connection string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MosaikParams {
    pub server: String,
    #[serde(default = "MosaikParams::default_database")]
    pub database: String,
    #[serde(default = "MosaikParams::default_trusted", rename = "Trusted_Connection")]
    pub trusted_connection: String,
    #[serde(default = "MosaikParams::default_driver")]
    pub driver: String,
}

impl MosaikParams {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            database: Self::default_database(),
            trusted_connection: Self::default_trusted(),
            driver: Self::default_driver(),
        }
    }

    fn default_database() -> String {
        "Mosaik".into()
    }

    fn default_trusted() -> String {
        "Yes".into()
    }

    fn default_driver() -> String {
        "{SQL Server}".into()
    }

    pub fn to_connection_string(&self) -> String {
        format!(
            "Server={};Database={};Trusted_Connection={};Driver={}",
            self.server, self.database, self.trusted_connection, self.driver
        )
    }
}
