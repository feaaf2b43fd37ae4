//! Turning configured sources into connectors

use recsync_connectors::Connector;

use crate::Result;
use crate::config::ConnectionStructure;

/// Builds a health-checked connector for a connection structure.
pub trait ConnectorFactory {
    fn connect(&self, structure: &ConnectionStructure) -> Result<Box<dyn Connector>>;
}

/// Dispatches on the configured connection type.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFactory;

impl ConnectorFactory for SourceFactory {
    fn connect(&self, structure: &ConnectionStructure) -> Result<Box<dyn Connector>> {
        let connector = structure
            .connection_type
            .resolve()?
            .healthy_connection(&structure.connection_info, structure.collection_info.clone())?;
        Ok(connector)
    }
}
