//! The connector contract and its SQL implementation

use crate::executor::QueryExecutor;
use crate::params::{ConnectionParams, ConnectionType};
use crate::query::Restriction;
use crate::{CollectionInfo, ConnectorError, DbRows, Dialect, Result};

/// Read access to one configured source collection.
pub trait Connector {
    /// The collection this connector reads
    fn collection(&self) -> &CollectionInfo;

    /// One representative row; fails with a connection failure when the
    /// source is unreachable or yields nothing.
    fn get_sample(&self) -> Result<DbRows>;

    /// Rows whose identifier, stringified, is not in `known`.
    /// An empty `known` selects every row.
    fn get_new(&self, known: &[String]) -> Result<DbRows>;

    /// Rows whose identifier is in `known`. An empty `known` returns an
    /// empty result without querying.
    fn get_old(&self, known: &[String]) -> Result<DbRows>;
}

/// Connector shared by every SQL backend.
pub struct SqlConnector {
    executor: Box<dyn QueryExecutor>,
    dialect: Dialect,
    collection: CollectionInfo,
    ident_limit: Option<usize>,
    label: String,
}

impl SqlConnector {
    pub fn new(
        executor: Box<dyn QueryExecutor>,
        dialect: Dialect,
        collection: CollectionInfo,
    ) -> Self {
        let label = executor.describe();
        Self {
            executor,
            dialect,
            collection,
            ident_limit: None,
            label,
        }
    }

    /// Cap the number of identifiers used in one restriction query.
    pub fn with_ident_limit(mut self, limit: Option<usize>) -> Self {
        self.ident_limit = limit;
        self
    }

    /// Resolve the backend for `connection_type` and build a connector.
    pub fn open(
        connection_type: ConnectionType,
        params: &ConnectionParams,
        collection: CollectionInfo,
    ) -> Result<Self> {
        collection.validate()?;
        let backend = connection_type.backend();
        let executor = connection_type.executor(params)?;
        Ok(Self::new(executor, backend.dialect, collection).with_ident_limit(backend.ident_limit))
    }

    fn restricted(&self, known: &[String], restriction: Restriction) -> Result<DbRows> {
        let idents = self.capped(known);
        let query = self.dialect.restricted_query(
            &self.collection.base_query(),
            &self.collection.ident,
            restriction,
            idents.len(),
        );
        self.executor.execute(&query, idents)
    }

    /// Identifiers arrive newest first; beyond the cap the oldest are dropped.
    fn capped<'a>(&self, known: &'a [String]) -> &'a [String] {
        match self.ident_limit {
            Some(limit) if known.len() > limit => {
                tracing::warn!(
                    source = %self.label,
                    known = known.len(),
                    limit,
                    "too many known identifiers for one query; restricting by the newest only"
                );
                &known[..limit]
            }
            _ => known,
        }
    }
}

impl Connector for SqlConnector {
    fn collection(&self) -> &CollectionInfo {
        &self.collection
    }

    fn get_sample(&self) -> Result<DbRows> {
        let query = self.dialect.sample_query(&self.collection.base_query());
        let rows = self.executor.execute(&query, &[]).map_err(|e| match e {
            ConnectorError::ConnectionFailure { .. } => e,
            other => ConnectorError::connection(&self.label, other.to_string()),
        })?;
        if rows.is_empty() {
            return Err(ConnectorError::connection(
                &self.label,
                format!("no sample row in '{}'", self.collection.collection_name),
            ));
        }
        Ok(rows)
    }

    fn get_new(&self, known: &[String]) -> Result<DbRows> {
        self.restricted(known, Restriction::Exclude)
    }

    fn get_old(&self, known: &[String]) -> Result<DbRows> {
        if known.is_empty() {
            return Ok(DbRows::empty());
        }
        self.restricted(known, Restriction::Include)
    }
}

/// Build a connector and prove it works by fetching a sample row.
///
/// This is the only gate a source passes before a sync touches it; any
/// failure comes back as a connection failure carrying the cause.
pub fn healthy_connection(
    connection_type: ConnectionType,
    params: &ConnectionParams,
    collection: CollectionInfo,
) -> Result<Box<dyn Connector>> {
    let connector = SqlConnector::open(connection_type, params, collection).map_err(|e| match e {
        ConnectorError::ConnectionFailure { .. } => e,
        other => ConnectorError::connection(connection_type.as_str(), other.to_string()),
    })?;
    connector.get_sample()?;
    tracing::info!(source = %connector.label, "source connection healthy");
    Ok(Box::new(connector))
}
