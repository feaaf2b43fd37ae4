//! Source connectors for recsync
//!
//! A connector reads one configured collection from a local data source and
//! answers the questions the reconciliation run asks of it:
//!
//! - **sample**: fetch one row to prove the source is reachable
//! - **new**: rows whose identifier the remote does not know yet
//! - **old**: rows whose identifier the remote already knows
//! - **introspection**: list collections and fields (not every backend)
//!
//! # Architecture
//!
//! Every backend is the same [`SqlConnector`] parameterized by a [`Dialect`]
//! and a [`QueryExecutor`]. [`ConnectionType`] is the closed set of
//! configurable backends and dispatches to the right combination:
//!
//! ```text
//!   ConnectionType ──> Backend { dialect, executor, limits }
//!                              │
//!                        SqlConnector ──> QueryExecutor (rusqlite | ODBC)
//! ```

pub mod collection;
pub mod connector;
pub mod error;
pub mod executor;
pub mod params;
pub mod query;
pub mod rows;
pub mod value;

pub use collection::CollectionInfo;
pub use connector::{Connector, SqlConnector, healthy_connection};
pub use error::{ConnectorError, Result};
pub use executor::{OdbcExecutor, QueryExecutor, SqliteExecutor};
pub use params::{Backend, ConnectionParams, ConnectionType, FieldListing, MosaikParams};
pub use query::Dialect;
pub use rows::DbRows;
pub use value::{Record, SqlValue};
