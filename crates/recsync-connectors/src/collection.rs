//! Description of one syncable source collection

use serde::{Deserialize, Serialize};

use crate::{ConnectorError, Result};

/// Which collection to read, which fields to select, and which field
/// identifies a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub collection_name: String,
    /// Projection order is the configured order
    pub fields: Vec<String>,
    pub ident: String,
    /// Replaces `SELECT <fields> FROM <collection>` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardcoded_query: Option<String>,
}

impl CollectionInfo {
    pub fn new(
        collection_name: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
        ident: impl Into<String>,
    ) -> Self {
        Self {
            collection_name: collection_name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            ident: ident.into(),
            hardcoded_query: None,
        }
    }

    pub fn with_hardcoded_query(mut self, query: impl Into<String>) -> Self {
        self.hardcoded_query = Some(query.into());
        self
    }

    /// Placeholder used by introspection, where no collection is chosen yet
    pub fn empty() -> Self {
        Self::new("empty collection", Vec::<String>::new(), "empty")
    }

    /// Check that `ident` is selected unless a hardcoded query decides the
    /// projection.
    pub fn validate(&self) -> Result<()> {
        if self.hardcoded_query.is_some() {
            return Ok(());
        }
        if self.fields.is_empty() {
            return Err(ConnectorError::Configuration {
                message: format!("no fields selected for '{}'", self.collection_name),
            });
        }
        if !self.fields.iter().any(|f| f == &self.ident) {
            return Err(ConnectorError::Configuration {
                message: format!(
                    "identifier '{}' is not one of the selected fields {:?}",
                    self.ident, self.fields
                ),
            });
        }
        Ok(())
    }

    /// Base row-selection query, without trailing semicolon
    pub fn base_query(&self) -> String {
        match &self.hardcoded_query {
            Some(query) => query.trim().trim_end_matches(';').trim_end().to_string(),
            None => format!(
                "SELECT {} FROM {}",
                self.fields.join(", "),
                self.collection_name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_query_projects_fields_in_order() {
        let info = CollectionInfo::new("assets", ["name", "id", "serial"], "id");
        assert_eq!(info.base_query(), "SELECT name, id, serial FROM assets");
    }

    #[test]
    fn hardcoded_query_wins_and_loses_semicolon() {
        let info = CollectionInfo::new("assets", ["id"], "id")
            .with_hardcoded_query("SELECT a.id, b.x FROM a JOIN b ON a.id = b.id; ");
        assert_eq!(
            info.base_query(),
            "SELECT a.id, b.x FROM a JOIN b ON a.id = b.id"
        );
    }

    #[test]
    fn validate_requires_ident_in_fields() {
        let info = CollectionInfo::new("assets", ["name"], "id");
        assert!(info.validate().is_err());

        let info = CollectionInfo::new("assets", ["name", "id"], "id");
        assert!(info.validate().is_ok());
    }

    #[test]
    fn validate_accepts_hardcoded_query_without_fields() {
        let info = CollectionInfo::new("assets", Vec::<String>::new(), "id")
            .with_hardcoded_query("SELECT * FROM assets");
        assert!(info.validate().is_ok());
    }

    #[test]
    fn deserializes_without_hardcoded_query() {
        let info: CollectionInfo = serde_json::from_str(
            r#"{"collection_name": "t", "fields": ["id", "name"], "ident": "id"}"#,
        )
        .unwrap();
        assert_eq!(info.hardcoded_query, None);
        assert_eq!(info.fields, vec!["id", "name"]);
    }
}
